/// Column types as numbered by the MariaDB/MySQL client protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Decimal,
    Tiny,
    Short,
    Long,
    Float,
    Double,
    Null,
    Timestamp,
    LongLong,
    Int24,
    Date,
    Time,
    DateTime,
    Year,
    NewDate,
    VarChar,
    Bit,
    Timestamp2,
    DateTime2,
    Time2,
    Json,
    NewDecimal,
    Enum,
    Set,
    TinyBlob,
    MediumBlob,
    LongBlob,
    Blob,
    VarString,
    String,
    Geometry,
    /// A code this crate has no name for.
    Other(u8),
}

impl FieldType {
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => FieldType::Decimal,
            1 => FieldType::Tiny,
            2 => FieldType::Short,
            3 => FieldType::Long,
            4 => FieldType::Float,
            5 => FieldType::Double,
            6 => FieldType::Null,
            7 => FieldType::Timestamp,
            8 => FieldType::LongLong,
            9 => FieldType::Int24,
            10 => FieldType::Date,
            11 => FieldType::Time,
            12 => FieldType::DateTime,
            13 => FieldType::Year,
            14 => FieldType::NewDate,
            15 => FieldType::VarChar,
            16 => FieldType::Bit,
            17 => FieldType::Timestamp2,
            18 => FieldType::DateTime2,
            19 => FieldType::Time2,
            245 => FieldType::Json,
            246 => FieldType::NewDecimal,
            247 => FieldType::Enum,
            248 => FieldType::Set,
            249 => FieldType::TinyBlob,
            250 => FieldType::MediumBlob,
            251 => FieldType::LongBlob,
            252 => FieldType::Blob,
            253 => FieldType::VarString,
            254 => FieldType::String,
            255 => FieldType::Geometry,
            other => FieldType::Other(other),
        }
    }

    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            FieldType::Decimal => 0,
            FieldType::Tiny => 1,
            FieldType::Short => 2,
            FieldType::Long => 3,
            FieldType::Float => 4,
            FieldType::Double => 5,
            FieldType::Null => 6,
            FieldType::Timestamp => 7,
            FieldType::LongLong => 8,
            FieldType::Int24 => 9,
            FieldType::Date => 10,
            FieldType::Time => 11,
            FieldType::DateTime => 12,
            FieldType::Year => 13,
            FieldType::NewDate => 14,
            FieldType::VarChar => 15,
            FieldType::Bit => 16,
            FieldType::Timestamp2 => 17,
            FieldType::DateTime2 => 18,
            FieldType::Time2 => 19,
            FieldType::Json => 245,
            FieldType::NewDecimal => 246,
            FieldType::Enum => 247,
            FieldType::Set => 248,
            FieldType::TinyBlob => 249,
            FieldType::MediumBlob => 250,
            FieldType::LongBlob => 251,
            FieldType::Blob => 252,
            FieldType::VarString => 253,
            FieldType::String => 254,
            FieldType::Geometry => 255,
            FieldType::Other(code) => code,
        }
    }
}

/// Server-reported metadata for one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMeta {
    pub name: String,
    pub field_type: FieldType,
    /// UNSIGNED flag.
    pub unsigned: bool,
    /// BINARY flag / binary collation; separates BLOB from TEXT.
    pub binary: bool,
    /// Declared display length. For BIT columns this is the bit width.
    pub length: u32,
}

impl FieldMeta {
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            unsigned: false,
            binary: false,
            length: 0,
        }
    }

    #[must_use]
    pub fn with_unsigned(mut self, unsigned: bool) -> Self {
        self.unsigned = unsigned;
        self
    }

    #[must_use]
    pub fn with_binary(mut self, binary: bool) -> Self {
        self.binary = binary;
        self
    }

    #[must_use]
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }
}
