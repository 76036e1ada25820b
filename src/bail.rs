/// Returns early with an [`std::io::Error`] of the given kind and a formatted message.
///
/// ```ignore
/// bail!(InvalidData, "invalid label length {}", len);
/// ```
#[macro_export]
macro_rules! bail {
    ($kind:ident, $($arg:tt)*) => {
        return Err(std::io::Error::new(
            std::io::ErrorKind::$kind,
            format!($($arg)*),
        )
        .into())
    };
}
