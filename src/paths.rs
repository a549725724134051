use std::{path::PathBuf, sync::LazyLock};

pub static DEFAULT_DATA_PATH: LazyLock<PathBuf> = LazyLock::new(|| {
    let mut path = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_default();

    path.push("newest-ge");
    path
});

/// Computes a path below the newest-ge data directory (`$XDG_DATA_HOME/newest-ge`).
///
/// Returns a `&Path` referencing the data directory itself if no arguments are passed in, or a
/// `PathBuf` created by joining all of the arguments to the data directory otherwise.
///
/// # Examples
///
/// ```
/// use newest_ge::data_path;
///
/// assert!(data_path!().ends_with("newest-ge"));
/// assert!(data_path!("logs").ends_with("newest-ge/logs"));
/// ```
#[macro_export]
macro_rules! data_path {
    () => {
        $crate::paths::DEFAULT_DATA_PATH.as_path()
    };

    ( $( $path:expr ),+ $(,)? ) => {
        [
            $crate::paths::DEFAULT_DATA_PATH.as_path(),
            $( std::path::Path::new(&$path) ),+
        ].into_iter().collect::<std::path::PathBuf>()
    };
}
