//! Codec Unit Tests.
//!
//! Verifies bit-exact packing for every layout, sign extension of odd-width fields,
//! and the two branch target rules.

use mipsim_core::isa::codec::{
    absolute_jump_address, decode, encode, opcode, relative_branch_target, sign_extend,
};
use mipsim_core::isa::format::{
    Fields, Format, I9Fields, I16Fields, I21Fields, I26Fields, IfpuFields, Pcrel16Fields,
    Pcrel19Fields, RFields, RfpuFields, RiFields, RifpuFields, RsopFields,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

// ══════════════════════════════════════════════════════════
// 1. Known encodings
// ══════════════════════════════════════════════════════════

#[test]
fn addiu_encodes_to_reference_word() {
    let fields = Fields::I16(I16Fields {
        opcode: 0x09,
        source: 0,
        target: 8,
        immediate: 5,
    });
    assert_eq!(encode(&fields), 0x2408_0005);
}

#[test]
fn r_format_places_every_field() {
    let fields = Fields::R(RFields {
        opcode: 0,
        source: 5,
        target: 0,
        destination: 3,
        shift_amount: 2,
        function: 0x20,
    });
    assert_eq!(encode(&fields), 0x00A0_18A0);
}

#[test]
fn r_format_decodes_reference_word() {
    let Fields::R(f) = decode(0x00A0_18A0, Format::R) else {
        panic!("R layout expected");
    };
    assert_eq!(f.source, 5);
    assert_eq!(f.target, 0);
    assert_eq!(f.destination, 3);
    assert_eq!(f.shift_amount, 2);
    assert_eq!(f.function, 0x20);
}

#[test]
fn i9_offset_sits_above_bit_six() {
    let word = encode(&Fields::I9(I9Fields {
        opcode: 0x1F,
        base: 1,
        target: 2,
        offset: 0x1FF,
        function: 0x36,
    }));
    assert_eq!(word & 0xFF80, 0x1FF << 7);
    assert_eq!(word & 0x40, 0, "bit 6 stays clear");
    assert_eq!(word & 0x3F, 0x36);
}

#[test]
fn rfpu_orders_ft_fs_fd() {
    let word = encode(&Fields::Rfpu(RfpuFields {
        opcode: 0x11,
        fmt: 0x10,
        target: 1,
        source: 2,
        destination: 3,
        function: 0,
    }));
    assert_eq!(word, (0x11 << 26) | (0x10 << 21) | (1 << 16) | (2 << 11) | (3 << 6));
}

#[test]
fn ri_function_occupies_rt_slot() {
    let word = encode(&Fields::Ri(RiFields {
        opcode: 1,
        source: 4,
        function: 0x11,
        immediate: 0xFFFF,
    }));
    assert_eq!(word, 0x0491_FFFF);
}

#[test]
fn pcrel19_selector_is_two_bits() {
    let word = encode(&Fields::Pcrel19(Pcrel19Fields {
        opcode: 0x3B,
        source: 8,
        pcrel: 0,
        immediate: 0x7_FFFF,
    }));
    assert_eq!(word, 0xED07_FFFF);
}

#[test]
fn j_and_i26_share_packing() {
    let f = I26Fields {
        opcode: 0x02,
        immediate: 0x010_0000,
    };
    assert_eq!(encode(&Fields::J(f)), encode(&Fields::I26(f)));
    assert_eq!(decode(encode(&Fields::J(f)), Format::J), Fields::J(f));
}

#[test]
fn opcode_reads_top_six_bits() {
    assert_eq!(opcode(0xFC00_0000), 0x3F);
    assert_eq!(opcode(0x2408_0005), 0x09);
}

#[test]
fn fields_report_their_format() {
    let fields = decode(0x2408_0005, Format::I16);
    assert_eq!(fields.format(), Format::I16);
    assert_eq!(fields.opcode(), 0x09);
}

// ══════════════════════════════════════════════════════════
// 2. Sign extension
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(0x155555, 21, -699_051)]
#[case(0x0FFFF, 21, 0xFFFF)]
#[case(0xFFFF, 16, -1)]
#[case(0x7FFF, 16, 0x7FFF)]
#[case(0x8000, 16, -32768)]
#[case(0x100, 9, -256)]
#[case(0x3FF_FFFF, 26, -1)]
#[case(0x4_0000, 19, -262_144)]
fn sign_extend_replicates_top_bit(#[case] value: u32, #[case] bits: u32, #[case] expected: i32) {
    assert_eq!(sign_extend(value, bits), expected);
}

#[test]
fn i21_field_round_trips_through_sign_extension() {
    let raw = encode(&Fields::I21(I21Fields {
        opcode: 0x36,
        register: 8,
        immediate: 0x155555,
    }));
    let Fields::I21(f) = decode(raw, Format::I21) else {
        panic!("I21 layout expected");
    };
    assert_eq!(sign_extend(f.immediate, 21), -699_051);
}

// ══════════════════════════════════════════════════════════
// 3. Branch targets
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(0x0040_0000, 0x0001, 16, 0x0040_0008)]
#[case(0x0040_0000, 0xFFFF, 16, 0x0040_0000)]
#[case(0x0040_0010, 0xFFFE, 16, 0x0040_000C)]
#[case(0x0040_0000, 0x3FF_FFFF, 26, 0x0040_0000)]
#[case(0x0040_0000, 0x1F_FFFE, 21, 0x003F_FFFC)]
fn relative_targets_count_from_next_instruction(
    #[case] pc: u32,
    #[case] offset: u32,
    #[case] bits: u32,
    #[case] expected: u32,
) {
    assert_eq!(relative_branch_target(pc, offset, bits), expected);
}

#[test]
fn absolute_jump_keeps_segment_of_next_pc() {
    assert_eq!(absolute_jump_address(0x10_0003, 0x0040_0000), 0x0040_000C);
    assert_eq!(absolute_jump_address(0, 0x8000_0100), 0x8000_0000);
}

#[test]
fn absolute_jump_segment_comes_from_pc_plus_four() {
    // The jump sits in the last word of a 256 MiB segment.
    assert_eq!(absolute_jump_address(0x40, 0x0FFF_FFFC), 0x1000_0100);
}

// ══════════════════════════════════════════════════════════
// 4. Round trips
// ══════════════════════════════════════════════════════════

fn op() -> impl Strategy<Value = u32> {
    0u32..64
}

fn reg() -> impl Strategy<Value = u32> {
    0u32..32
}

/// Any legal field assignment of any format.
fn any_fields() -> impl Strategy<Value = Fields> {
    prop_oneof![
        (op(), reg(), reg(), reg(), reg(), op()).prop_map(
            |(opcode, source, target, destination, shift_amount, function)| {
                Fields::R(RFields {
                    opcode,
                    source,
                    target,
                    destination,
                    shift_amount,
                    function,
                })
            }
        ),
        (op(), reg(), reg(), 0u32..0x1_0000).prop_map(|(opcode, source, target, immediate)| {
            Fields::I16(I16Fields { opcode, source, target, immediate })
        }),
        (op(), reg(), 0u32..0x20_0000).prop_map(|(opcode, register, immediate)| {
            Fields::I21(I21Fields { opcode, register, immediate })
        }),
        (op(), 0u32..0x400_0000)
            .prop_map(|(opcode, immediate)| Fields::I26(I26Fields { opcode, immediate })),
        (op(), 0u32..0x400_0000)
            .prop_map(|(opcode, immediate)| Fields::J(I26Fields { opcode, immediate })),
        (op(), reg(), reg(), 0u32..0x200, op()).prop_map(
            |(opcode, base, target, offset, function)| {
                Fields::I9(I9Fields { opcode, base, target, offset, function })
            }
        ),
        (op(), reg(), reg(), 0u32..0x1_0000).prop_map(|(opcode, base, target, immediate)| {
            Fields::Ifpu(IfpuFields { opcode, base, target, immediate })
        }),
        (op(), reg(), reg(), reg(), reg(), op()).prop_map(
            |(opcode, fmt, target, source, destination, function)| {
                Fields::Rfpu(RfpuFields {
                    opcode,
                    fmt,
                    target,
                    source,
                    destination,
                    function,
                })
            }
        ),
        (op(), reg(), reg(), reg(), 0u32..0x800).prop_map(
            |(opcode, subcode, target, source, immediate)| {
                Fields::Rifpu(RifpuFields { opcode, subcode, target, source, immediate })
            }
        ),
        (op(), reg(), reg(), reg(), reg(), op()).prop_map(
            |(opcode, source, target, destination, sop, function)| {
                Fields::Rsop(RsopFields {
                    opcode,
                    source,
                    target,
                    destination,
                    sop,
                    function,
                })
            }
        ),
        (op(), reg(), reg(), 0u32..0x1_0000).prop_map(|(opcode, source, function, immediate)| {
            Fields::Ri(RiFields { opcode, source, function, immediate })
        }),
        (op(), reg(), reg(), 0u32..0x1_0000).prop_map(|(opcode, source, pcrel, immediate)| {
            Fields::Pcrel16(Pcrel16Fields { opcode, source, pcrel, immediate })
        }),
        (op(), reg(), 0u32..4, 0u32..0x8_0000).prop_map(|(opcode, source, pcrel, immediate)| {
            Fields::Pcrel19(Pcrel19Fields { opcode, source, pcrel, immediate })
        }),
    ]
}

proptest! {
    #[test]
    fn every_format_round_trips(fields in any_fields()) {
        let raw = encode(&fields);
        prop_assert_eq!(decode(raw, fields.format()), fields);
        prop_assert_eq!(opcode(raw), fields.opcode());
    }

    #[test]
    fn any_word_survives_r_decode_encode(raw in any::<u32>()) {
        prop_assert_eq!(encode(&decode(raw, Format::R)), raw);
    }

    #[test]
    fn any_word_survives_i26_decode_encode(raw in any::<u32>()) {
        prop_assert_eq!(encode(&decode(raw, Format::I26)), raw);
    }
}
