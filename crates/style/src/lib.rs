pub mod computed;
pub mod parsers;
pub mod selector;

pub use computed::{
    ComputedStyle, DEFAULT_FONT_SIZE, Display, Float, FlexDirection, GridAutoFlow, LineHeight,
    Position, Visibility, WhiteSpace,
};
pub use parsers::{StyleParseError, parse_declarations};
pub use selector::{Selector, SelectorList, SelectorSubject};
