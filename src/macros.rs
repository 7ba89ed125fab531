/// Macro for skipping malformed input inside a loop
/// ```
/// # use gitstatus::macros::ok_or_continue;
/// // Numstat columns are either numbers or '-' for binary files
/// let columns = ["3", "-", "4"];
///
/// // Should add 3 and 4
/// // and just skip the binary marker
/// let mut sum = 0;
/// for column in columns {
///     sum += ok_or_continue!(column.parse::<usize>());
/// }
///
/// assert_eq!(sum, 7);
/// ```
#[doc(hidden)] #[macro_export]
macro_rules! __ok_or_continue {
    ($res:expr) => {
        match $res {
            Ok(v) => v,
            Err(e) => {
                log::warn!("Skipped malformed input: {}", e);
                continue;
            },
        }
    };
}

#[doc(inline)]
pub use __ok_or_continue as ok_or_continue;
