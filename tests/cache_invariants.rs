use corekit::cache::{Cache, CacheConfig};
use proptest::prelude::*;

proptest! {
    #[test]
    fn size_never_exceeds_configured_max(ops in proptest::collection::vec(0u8..20, 1..200)) {
        let cache = Cache::<u8>::new(CacheConfig::with_max_size(5));
        for op in ops {
            cache.set(format!("k{op}"), op, None);
            prop_assert!(cache.len() <= 5);
        }
    }
}
