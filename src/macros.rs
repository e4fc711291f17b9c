/// Builds a [`Dict`](crate::Dict) from a literal tag list.
///
/// A bare name adds a marker tag; `name => expr` adds any value convertible
/// into [`Value`](crate::Value). The macro evaluates to
/// `Result<Dict>` and fails on the first invalid tag name.
///
/// # Examples
///
/// ```rust
/// use serde_haystack::{dict, Value};
///
/// let rec = dict! { "site", "dis" => "HQ", "area" => 1200 }.unwrap();
/// assert!(rec.has("site"));
/// assert_eq!(rec.get("area"), Some(&Value::from(1200)));
///
/// assert!(dict! {}.unwrap().is_empty());
/// assert!(dict! { "Bad" }.is_err());
/// ```
#[macro_export]
macro_rules! dict {
    (@entries $b:ident $res:ident) => {};

    (@entries $b:ident $res:ident ,) => {};

    (@entries $b:ident $res:ident $name:literal => $val:expr $(, $($rest:tt)*)?) => {
        if $res.is_ok() {
            $res = $b.add($name, $val).map(|_| ());
        }
        $crate::dict!(@entries $b $res $($($rest)*)?);
    };

    (@entries $b:ident $res:ident $name:literal $(, $($rest:tt)*)?) => {
        if $res.is_ok() {
            $res = $b.add_marker($name).map(|_| ());
        }
        $crate::dict!(@entries $b $res $($($rest)*)?);
    };

    () => {
        $crate::Result::<$crate::Dict>::Ok($crate::Dict::empty())
    };

    ($($tt:tt)+) => {{
        let mut builder = $crate::DictBuilder::new();
        let mut res: $crate::Result<()> = Ok(());
        $crate::dict!(@entries builder res $($tt)+);
        res.map(|()| builder.into_dict())
    }};
}

#[cfg(test)]
mod tests {
    use crate::{Number, Ref, Value};

    #[test]
    fn test_dict_macro_markers() {
        let d = dict! { "site", "equip" }.unwrap();
        assert_eq!(d.len(), 2);
        assert_eq!(d.get("site"), Some(&Value::Marker));
    }

    #[test]
    fn test_dict_macro_values() {
        let d = dict! {
            "id" => Ref::new("a-1").unwrap(),
            "temp" => Number::with_unit(20.5, "°C").unwrap(),
            "enabled" => true,
        }
        .unwrap();
        assert_eq!(d.id().map(Ref::id), Some("a-1"));
        assert_eq!(d.get("enabled"), Some(&Value::Bool(true)));
        assert_eq!(d.keys().collect::<Vec<_>>(), vec!["enabled", "id", "temp"]);
    }

    #[test]
    fn test_dict_macro_mixed_and_empty() {
        let d = dict! { "point", "curVal" => 72, "his" }.unwrap();
        assert_eq!(d.len(), 3);
        assert!(dict! {}.unwrap().is_empty());
    }

    #[test]
    fn test_dict_macro_invalid_name() {
        let err = dict! { "ok", "Not Valid" => 1 }.unwrap_err();
        assert!(err.to_string().contains("Not Valid"));
    }
}
