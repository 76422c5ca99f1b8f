/// Render a message template, substituting `key = value` pairs.
///
/// ```
/// use nexus_messages::msg;
/// let text = msg!("use proxy at {host}:{port}", host = "proxy", port = "8080");
/// assert_eq!(text, "use proxy at proxy:8080");
/// ```
#[macro_export]
macro_rules! msg {
    ($template:expr) => {
        $crate::builder::MessageBuilder::new($template).build()
    };
    ($template:expr, $($key:ident = $value:expr),+ $(,)?) => {
        {
            let mut builder = $crate::builder::MessageBuilder::new($template);
            $(
                builder = builder.var(stringify!($key), $value);
            )+
            builder.build()
        }
    };
}
