//! Convenience macros for plugin authors.

/// Exports the entry point a dynamic plugin library must provide.
///
/// The constructor expression is evaluated on every call and must yield a
/// [`Plugin`](crate::plugin::Plugin). With the `default:` prefix the
/// plugin is exported as the default export, which wins over a named one.
///
/// # Example
/// ```rust,ignore
/// fn build() -> Plugin {
///     Plugin::new("seo", "1.0.0")
/// }
///
/// plughub_runtime::export_plugin!(default: build());
/// ```
#[macro_export]
macro_rules! export_plugin {
    (default: $ctor:expr) => {
        #[unsafe(no_mangle)]
        #[allow(improper_ctypes_definitions)]
        pub extern "C" fn plughub_default_plugin() -> *mut $crate::plugin::Plugin {
            ::std::boxed::Box::into_raw(::std::boxed::Box::new($ctor))
        }
    };
    ($ctor:expr) => {
        #[unsafe(no_mangle)]
        #[allow(improper_ctypes_definitions)]
        pub extern "C" fn plughub_plugin() -> *mut $crate::plugin::Plugin {
            ::std::boxed::Box::into_raw(::std::boxed::Box::new($ctor))
        }
    };
}

/// Builds a plugin config object (`serde_json::Map`).
///
/// # Example
/// ```rust,ignore
/// let config = plugin_config!({
///     "title" => json!("Home"),
///     "limit" => json!(10),
/// });
/// ```
#[macro_export]
macro_rules! plugin_config {
    () => {
        ::serde_json::Map::<::std::string::String, ::serde_json::Value>::new()
    };
    ({ $($key:expr => $value:expr),* $(,)? }) => {{
        let mut config = ::serde_json::Map::<::std::string::String, ::serde_json::Value>::new();
        $(
            config.insert($key.to_string(), $value);
        )*
        config
    }};
}
