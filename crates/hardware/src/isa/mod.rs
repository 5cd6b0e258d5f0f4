//! Instruction Set Architecture (ISA) Definitions.
//!
//! Contains the bit-exact codec for every MIPS32 instruction format, the decode-table
//! seam the engine fetches through, and the default MIPS32 instruction set.
//!
//! # Layout
//!
//! * `format`: Instruction formats and their field sets.
//! * `codec`: Encoding, decoding, sign extension and branch target resolution.
//! * `instruction`: A decoded word bound to its definition.
//! * `table`: `DecodeTable`/`InstructionDefinition` traits and the mask/pattern table.
//! * `mips32`: The executable MIPS32 subset.

/// Pure encode/decode of instruction words.
pub mod codec;

/// Instruction formats and field sets.
pub mod format;

/// Decoded instruction words.
pub mod instruction;

/// Default MIPS32 instruction definitions and semantics.
pub mod mips32;

/// Decode tables and instruction definitions.
pub mod table;

pub use self::format::{Fields, Format};
pub use self::instruction::AssembledInstruction;
pub use self::table::{BasicInstruction, DecodeTable, InstructionDefinition, InstructionSet};
