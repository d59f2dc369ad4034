// ============================================================================
// spark-props - Declaration Macros
// ============================================================================

/// Build a declaration list for [`Reactor::new`](crate::Reactor::new).
///
/// `key = value` declares a stored property; `key => derivation` declares a
/// derived one.
///
/// # Usage
///
/// ```rust
/// use spark_props::{decls, Reactor, Value};
///
/// let r: Reactor<Value> = Reactor::new(decls! {
///     name = "No One",
///     house = "Stark",
///     greeting => |r: &Reactor<Value>| {
///         Ok(format!("{} of House {}", r.get("name")?, r.get("house")?).into())
///     },
/// })
/// .unwrap();
///
/// assert_eq!(r.get("greeting").unwrap(), Value::from("No One of House Stark"));
/// ```
#[macro_export]
macro_rules! decls {
    (@acc [$($out:tt)*]) => {
        ::std::vec![$($out)*]
    };
    (@acc [$($out:tt)*] $key:ident = $value:expr $(, $($rest:tt)*)?) => {
        $crate::decls!(@acc [$($out)* (stringify!($key), $crate::Decl::stored($value)),] $($($rest)*)?)
    };
    (@acc [$($out:tt)*] $key:ident => $derive:expr $(, $($rest:tt)*)?) => {
        $crate::decls!(@acc [$($out)* (stringify!($key), $crate::Decl::derived($derive)),] $($($rest)*)?)
    };
    ($($body:tt)*) => {
        $crate::decls!(@acc [] $($body)*)
    };
}

#[cfg(test)]
mod tests {
    use crate::{PropKind, Reactor};

    #[test]
    fn decls_macro_marks_kinds() {
        let r: Reactor<i64> = Reactor::new(decls! {
            x = 2,
            double => |r: &Reactor<i64>| Ok(r.get("x")? * 2)
        })
        .unwrap();

        assert_eq!(r.kind("x"), Ok(PropKind::Stored));
        assert_eq!(r.kind("double"), Ok(PropKind::Derived));
        assert_eq!(r.get("double"), Ok(4));
    }

    #[test]
    fn decls_macro_keeps_declaration_order() {
        let r: Reactor<i64> = Reactor::new(decls! { b = 1, a = 2, c => |_: &Reactor<i64>| Ok(3), })
            .unwrap();
        let keys: Vec<&str> = r.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }
}
