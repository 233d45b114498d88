//! Metadata tokens used as instruction operands.
//!
//! A [`Token`] is the 32-bit reference a call instruction carries to name the operation it
//! invokes. The high byte selects the metadata table, the low 24 bits the row. The patch
//! engine treats tokens as opaque identities: two call-sites invoke the same operation
//! exactly when their tokens compare equal.

use std::fmt;

/// `TypeDef` table id.
pub const TABLE_TYPE_DEF: u8 = 0x02;
/// `MethodDef` table id (operations defined in the inspected module).
pub const TABLE_METHOD_DEF: u8 = 0x06;
/// `MemberRef` table id (operations defined in another module, e.g. `System.String`).
pub const TABLE_MEMBER_REF: u8 = 0x0A;
/// `MethodSpec` table id (generic instantiations).
pub const TABLE_METHOD_SPEC: u8 = 0x2B;

/// A metadata token identifying one row of one metadata table.
///
/// # Examples
///
/// ```rust
/// use cilpatch::metadata::token::Token;
///
/// let token = Token::member_ref(5);
/// assert_eq!(token.value(), 0x0A00_0005);
/// assert!(token.is_method());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(pub u32);

impl Token {
    /// Creates a token from its raw 32-bit value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates a token from a table id and a row index.
    ///
    /// Rows wider than 24 bits are truncated, as the encoding has no room for them.
    #[must_use]
    pub const fn from_parts(table: u8, row: u32) -> Self {
        Token(((table as u32) << 24) | (row & 0x00FF_FFFF))
    }

    /// Creates a `MethodDef` token.
    #[must_use]
    pub const fn method_def(row: u32) -> Self {
        Self::from_parts(TABLE_METHOD_DEF, row)
    }

    /// Creates a `MemberRef` token.
    #[must_use]
    pub const fn member_ref(row: u32) -> Self {
        Self::from_parts(TABLE_MEMBER_REF, row)
    }

    /// Raw 32-bit value.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Table id (high byte).
    #[must_use]
    pub const fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Row index (low 24 bits).
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// A null token references no row at all.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.row() == 0
    }

    /// Returns `true` if this token can name a callable operation.
    #[must_use]
    pub const fn is_method(&self) -> bool {
        matches!(
            self.table(),
            TABLE_METHOD_DEF | TABLE_MEMBER_REF | TABLE_METHOD_SPEC
        )
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}
