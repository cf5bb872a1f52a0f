//! Editor core for forests of labeled trees written in bracket notation.
//!
//! Text such as `["Hello" ["A"]["B"]]` is parsed into a [`forest::Forest`],
//! edited through pure structural mutators, laid out for display, and
//! hit-tested for selection and drag-and-drop. Every structural edit is
//! serialized back to text, so the text and the diagram never drift apart.
//! Drawing, DOM events, and widgets belong to the host; the host supplies
//! text metrics and forwards input to [`engine::EngineCore`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`tokeniser`] | Regex tokeniser with lookahead |
//! | [`parse`] | Bracket-notation parser and serializer |
//! | [`forest`] | Forest/tree model and structural mutators |
//! | [`layout`] | Text measurement and the tree layout engine |
//! | [`hit`] | Point-to-node and point-to-insertion-slot queries |
//! | [`session`] | Editor state reducer keeping text and forest in sync |
//! | [`history`] | Undo/redo with time-based step merging |
//! | [`dnd`] | Drag-and-drop gesture state |
//! | [`engine`] | Pointer/keyboard driven [`engine::EngineCore`] |
//! | [`config`] | Editor configuration from the environment |
//! | [`geom`] | Points and rectangles |
//! | [`error`] | Error-code trait shared by error types |
//! | [`consts`] | Layout and hit-testing constants |

pub mod config;
pub mod consts;
pub mod dnd;
pub mod engine;
pub mod error;
pub mod forest;
pub mod geom;
pub mod history;
pub mod hit;
pub mod layout;
pub mod parse;
pub mod session;
pub mod tokeniser;

pub use forest::{Arrow, Forest, Node, NodeId, Side, Tree, TreeInsertionPosition};
pub use parse::{ParseError, parse, unparse};
