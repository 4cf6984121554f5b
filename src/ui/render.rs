mod charts;
mod formatting;
mod frame;
mod header;
mod lifecycle;
mod sites;
mod theme;

pub use frame::draw_frame;
pub use lifecycle::{TerminalGuard, Ui, UiActions};
