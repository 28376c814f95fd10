/// Build a local `Error` carrying `file!()` / `line!()`.
///
/// ```ignore
/// return Err(local_err!("dimension index {} out of range", index));
/// return Err(local_err!(source = io_err, "cannot stage {}", path));
/// ```
#[macro_export]
macro_rules! local_err {
    (source = $source:expr, $($fmt:tt)+) => {
        $crate::error::Error::at(
            $crate::error::ErrorKind::Local,
            format!($($fmt)+),
            file!(),
            line!(),
        )
        .with_source($source)
    };
    ($($fmt:tt)+) => {
        $crate::error::Error::at(
            $crate::error::ErrorKind::Local,
            format!($($fmt)+),
            file!(),
            line!(),
        )
    };
}

/// Return a local error from the enclosing function unless `cond` holds.
///
/// ```ignore
/// ensure_local!(index < rank, "index {} exceeds rank {}", index, rank);
/// ```
#[macro_export]
macro_rules! ensure_local {
    ($cond:expr, $($fmt:tt)+) => {
        if !$cond {
            return Err($crate::local_err!($($fmt)+));
        }
    };
}
