//! Accessor generation macros
//!
//! These macros eliminate repetitive match code on the node enums of the
//! model and view trees. They use `paste` internally for identifier
//! concatenation.

// =============================================================================
// Enum accessor generation
// =============================================================================

/// Generate is_xxx, as_xxx, as_xxx_mut for enums with single-field variants
///
/// # Generated methods per variant:
/// - `is_xxx(&self) -> bool`
/// - `as_xxx(&self) -> Option<&Type>`
/// - `as_xxx_mut(&mut self) -> Option<&mut Type>`
///
/// # Example
/// ```ignore
/// impl Node {
///     impl_enum_accessors!(element => Element(Element), text => Text(Text));
/// }
/// ```
#[macro_export]
macro_rules! impl_enum_accessors {
    ($($method:ident => $variant:ident($ty:ty)),* $(,)?) => {
        ::paste::paste! {
            $(
                #[doc = "Check if this is a " $method " node"]
                #[inline]
                pub fn [<is_ $method>](&self) -> bool {
                    matches!(self, Self::$variant(_))
                }

                #[doc = "Try to get as " $method " reference"]
                #[inline]
                pub fn [<as_ $method>](&self) -> Option<&$ty> {
                    match self { Self::$variant(v) => Some(v), _ => None }
                }

                #[doc = "Try to get as mutable " $method " reference"]
                #[inline]
                pub fn [<as_ $method _mut>](&mut self) -> Option<&mut $ty> {
                    match self { Self::$variant(v) => Some(v), _ => None }
                }
            )*
        }
    };
}

/// Generate `is_xxx` name predicates for element-like types with a `name` field
///
/// # Example
/// ```ignore
/// impl Element {
///     impl_name_predicates!(paragraph => PARAGRAPH, soft_break => SOFT_BREAK);
/// }
/// // Expands to: pub fn is_paragraph(&self) -> bool { self.name == PARAGRAPH } ...
/// ```
#[macro_export]
macro_rules! impl_name_predicates {
    ($($method:ident => $name:expr),* $(,)?) => {
        ::paste::paste! {
            $(
                #[doc = "Check if this element is named `" $method "`"]
                #[inline]
                pub fn [<is_ $method>](&self) -> bool {
                    self.name == $name
                }
            )*
        }
    };
}

#[cfg(test)]
mod tests {
    #[derive(Debug)]
    enum Shape {
        Circle(u32),
        Label(String),
    }

    impl Shape {
        impl_enum_accessors!(circle => Circle(u32), label => Label(String));
    }

    struct Named {
        name: &'static str,
    }

    impl Named {
        impl_name_predicates!(alpha => "alpha", beta => "beta");
    }

    #[test]
    fn test_enum_accessors() {
        let mut shape = Shape::Circle(3);
        assert!(shape.is_circle());
        assert!(!shape.is_label());
        assert_eq!(shape.as_circle(), Some(&3));
        assert!(shape.as_label().is_none());

        if let Some(radius) = shape.as_circle_mut() {
            *radius = 5;
        }
        assert_eq!(shape.as_circle(), Some(&5));

        let label = Shape::Label("x".into());
        assert_eq!(label.as_label().map(String::as_str), Some("x"));
    }

    #[test]
    fn test_name_predicates() {
        let named = Named { name: "beta" };
        assert!(named.is_beta());
        assert!(!named.is_alpha());
    }
}
