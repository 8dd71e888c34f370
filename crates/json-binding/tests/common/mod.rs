//! Helpers shared by the integration tests.

/// Generate one test module per check, running the check once per storage
/// backend.
macro_rules! for_each_backend {
    ($($name:ident => $check:ident),* $(,)?) => {
        $(
            mod $name {
                #[test]
                fn plain() {
                    super::$check::<::json_binding::PlainAdapter>();
                }

                #[test]
                fn snapshot() {
                    super::$check::<::json_binding::SnapshotAdapter>();
                }

                #[test]
                fn observable() {
                    super::$check::<::json_binding::ObservableAdapter>();
                }
            }
        )*
    };
}
