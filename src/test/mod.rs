//! Shared fixtures for unit tests: an in-memory host, entities, sessions and the tokens the
//! mock host assigns to catalog operations.


pub use actors::{PanickingEntity, TestEntity, TestSession};
pub use host::MockHost;

use crate::metadata::token::Token;

pub const IS_COLLIDING_POSITION_TOKEN: Token = Token::method_def(0x0101);
pub const IS_TEMP_TOKEN: Token = Token::method_def(0x0102);
pub const FIND_PLAYER_TOKEN: Token = Token::method_def(0x0201);
pub const STARTS_WITH_TOKEN: Token = Token::member_ref(0x0031);
pub const ORDINAL_STARTS_WITH_TOKEN: Token = Token::member_ref(0x0032);
