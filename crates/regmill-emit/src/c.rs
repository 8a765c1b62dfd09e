//! C header emission for firmware access to the register map.
//!
//! One self-contained `<map>_regs.h`: index and byte-address defines, field
//! shift and mask defines, C enums for enumerated fields, register default
//! values, map constants, and a volatile struct overlaying the register
//! block. Macro names are the uppercased `MAP_REGISTER_FIELD` spelling, so
//! the only identifiers emitted in lowercase are struct members and enum
//! type names.

use regmill_core::{ConstantValue, FieldKind, RegisterMap};

use crate::error::{EmitError, Result};

/// Keywords of C11 that fall inside the lowercase identifier charset.
/// A register or field with one of these names cannot become a struct
/// member, so the header is refused.
const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while",
];

/// Render `<map>_regs.h`.
pub fn render(map: &RegisterMap) -> Result<String> {
    check_identifiers(map)?;
    let word = word_type(map)?;
    let bytes = map.word_bytes();
    let upper = map.name.to_uppercase();

    let mut v: Vec<String> = Vec::new();
    v.push(format!(
        "/* Generated by regmill {}. Do not edit. */",
        env!("CARGO_PKG_VERSION")
    ));
    v.push(format!("/* Register map: {} */", map.name));
    v.push(format!("/* Model fingerprint: {} */", map.fingerprint()));
    v.push(String::new());
    v.push(format!("#ifndef {upper}_REGS_H"));
    v.push(format!("#define {upper}_REGS_H"));
    v.push(String::new());
    v.push("#include <stdint.h>".into());
    v.push(String::new());
    v.push(format!("#define {upper}_WORD_WIDTH ({}u)", map.word_width));
    v.push(format!(
        "#define {upper}_NUM_REGISTERS ({}u)",
        map.element_count()
    ));

    if !map.registers.is_empty() {
        v.push(String::new());
        v.push("/* Register indexes and byte addresses. */".into());
        for r in &map.registers {
            let ru = r.name.to_uppercase();
            v.push(format!("#define {upper}_{ru}_INDEX ({}u)", r.address / bytes));
            if r.is_array() {
                v.push(format!("#define {upper}_{ru}_ARRAY_LENGTH ({}u)", r.count));
                v.push(format!(
                    "#define {upper}_{ru}_BASE_ADDRESS ({})",
                    hex(r.address)
                ));
                v.push(format!(
                    "#define {upper}_{ru}_ADDRESS(index) ({} + {} * (index))",
                    hex(r.address),
                    hex(bytes)
                ));
            } else {
                v.push(format!("#define {upper}_{ru}_ADDRESS ({})", hex(r.address)));
            }
        }
    }

    for r in map.registers.iter().filter(|r| !r.fields.is_empty()) {
        let ru = r.name.to_uppercase();
        v.push(String::new());
        v.push(format!("/* {} fields. */", r.name));
        for f in &r.fields {
            let fu = f.name.to_uppercase();
            v.push(format!("#define {upper}_{ru}_{fu}_SHIFT ({}u)", f.lsb()));
            v.push(format!("#define {upper}_{ru}_{fu}_MASK ({})", hex(f.mask())));
        }
    }

    for r in &map.registers {
        for f in &r.fields {
            if let FieldKind::Enum(e) = &f.kind {
                v.push(String::new());
                v.push(format!("/* Values of {}.{}. */", r.name, f.name));
                v.push(format!(
                    "typedef enum {}_{}_{} {{",
                    map.name, r.name, f.name
                ));
                for (i, m) in e.members.iter().enumerate() {
                    let sep = if i + 1 == e.members.len() { "" } else { "," };
                    v.push(format!(
                        "  {upper}_{}_{}_{} = {}{sep}",
                        r.name.to_uppercase(),
                        f.name.to_uppercase(),
                        m.name.to_uppercase(),
                        m.value
                    ));
                }
                v.push(format!("}} {}_{}_{}_t;", map.name, r.name, f.name));
            }
        }
    }

    if !map.registers.is_empty() {
        v.push(String::new());
        v.push("/* Register default values. */".into());
        for r in &map.registers {
            v.push(format!(
                "#define {upper}_{}_DEFAULT ({})",
                r.name.to_uppercase(),
                hex(r.default_word())
            ));
        }
    }

    if !map.constants.is_empty() {
        v.push(String::new());
        v.push("/* Map constants. */".into());
        for c in &map.constants {
            v.push(format!(
                "#define {upper}_{} ({})",
                c.name.to_uppercase(),
                constant_value(&c.name, &c.value)?
            ));
        }
    }

    if !map.registers.is_empty() {
        v.push(String::new());
        v.push("/* Memory-mapped register block. */".into());
        v.push(format!("typedef struct {}_regs_t {{", map.name));
        let mut cursor = 0u64;
        let mut pad = 0usize;
        for r in &map.registers {
            if r.address > cursor {
                let words = (r.address - cursor) / bytes;
                v.push(format!("  {word} _reserved{pad}[{words}];"));
                pad += 1;
            }
            if r.is_array() {
                v.push(format!("  volatile {word} {}[{}];", r.name, r.count));
            } else {
                v.push(format!("  volatile {word} {};", r.name));
            }
            cursor = cursor.max(r.end_address(bytes));
        }
        v.push(format!("}} {}_regs_t;", map.name));
    }

    v.push(String::new());
    v.push(format!("#endif /* {upper}_REGS_H */"));

    Ok(v.join("\n") + "\n")
}

fn check_identifiers(map: &RegisterMap) -> Result<()> {
    for r in &map.registers {
        if C_KEYWORDS.contains(&r.name.as_str()) {
            return Err(keyword("register", &r.name));
        }
        for f in &r.fields {
            if C_KEYWORDS.contains(&f.name.as_str()) {
                return Err(keyword("field", &f.name));
            }
        }
    }
    Ok(())
}

fn keyword(what: &str, name: &str) -> EmitError {
    EmitError::Unsupported {
        target: "c-header",
        message: format!("{what} name `{name}` is a C keyword"),
    }
}

fn word_type(map: &RegisterMap) -> Result<&'static str> {
    Ok(match map.word_width {
        8 => "uint8_t",
        16 => "uint16_t",
        32 => "uint32_t",
        64 => "uint64_t",
        w => {
            return Err(EmitError::Unsupported {
                target: "c-header",
                message: format!("word width {w} has no fixed-width C integer type"),
            })
        }
    })
}

/// Hex literal with the narrowest standard suffix.
fn hex(value: u64) -> String {
    if value > u64::from(u32::MAX) {
        format!("{value:#x}ull")
    } else {
        format!("{value:#x}u")
    }
}

fn constant_value(name: &str, value: &ConstantValue) -> Result<String> {
    Ok(match value {
        ConstantValue::Integer(n) => n.to_string(),
        ConstantValue::Boolean(b) => u8::from(*b).to_string(),
        ConstantValue::BitVector(bits) => {
            if bits.len() > 64 {
                return Err(EmitError::Unsupported {
                    target: "c-header",
                    message: format!("bit vector constant `{name}` does not fit a 64-bit integer"),
                });
            }
            hex(u64::from_str_radix(bits, 2).unwrap_or(0))
        }
        ConstantValue::String(s) => format!("{s:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use regmill_spec::load_str;

    const UART: &str = r#"
name = "uart"

[[register]]
name = "status"
mode = "read-only"

[[register.field]]
name = "ready"
width = 1

[[register.field]]
name = "error_code"
width = 3

[[register]]
name = "control"
mode = "read-write"
address = 0x10

[[register.field]]
name = "direction"
width = 2
type = "enum"
values = ["input", "output", "loopback"]
default = "output"

[[register]]
name = "samples"
mode = "read-only"
count = 4

[[register.field]]
name = "level"
width = 8

[[constant]]
name = "fifo_depth"
value = 16
"#;

    fn render_uart() -> String {
        let map = load_str("uart", UART).unwrap().0;
        render(&map).unwrap()
    }

    #[test]
    fn guard_and_geometry() {
        let text = render_uart();
        assert!(text.starts_with("/* Generated by regmill "));
        assert!(text.contains("#ifndef UART_REGS_H"));
        assert!(text.contains("#define UART_WORD_WIDTH (32u)"));
        assert!(text.contains("#define UART_NUM_REGISTERS (6u)"));
        assert!(text.ends_with("#endif /* UART_REGS_H */\n"));
    }

    #[test]
    fn indexes_and_addresses() {
        let text = render_uart();
        assert!(text.contains("#define UART_STATUS_INDEX (0u)"));
        assert!(text.contains("#define UART_STATUS_ADDRESS (0x0u)"));
        assert!(text.contains("#define UART_CONTROL_INDEX (4u)"));
        assert!(text.contains("#define UART_CONTROL_ADDRESS (0x10u)"));
    }

    #[test]
    fn array_registers_get_a_parameterized_address() {
        let text = render_uart();
        assert!(text.contains("#define UART_SAMPLES_INDEX (5u)"));
        assert!(text.contains("#define UART_SAMPLES_ARRAY_LENGTH (4u)"));
        assert!(text.contains("#define UART_SAMPLES_BASE_ADDRESS (0x14u)"));
        assert!(text.contains("#define UART_SAMPLES_ADDRESS(index) (0x14u + 0x4u * (index))"));
    }

    #[test]
    fn field_shift_and_shifted_mask() {
        let text = render_uart();
        assert!(text.contains("#define UART_STATUS_READY_SHIFT (0u)"));
        assert!(text.contains("#define UART_STATUS_READY_MASK (0x1u)"));
        assert!(text.contains("#define UART_STATUS_ERROR_CODE_SHIFT (1u)"));
        assert!(text.contains("#define UART_STATUS_ERROR_CODE_MASK (0xeu)"));
    }

    #[test]
    fn enumerated_fields_become_c_enums() {
        let text = render_uart();
        assert!(text.contains("typedef enum uart_control_direction {"));
        assert!(text.contains("  UART_CONTROL_DIRECTION_INPUT = 0,"));
        assert!(text.contains("  UART_CONTROL_DIRECTION_LOOPBACK = 2\n"));
        assert!(text.contains("} uart_control_direction_t;"));
    }

    #[test]
    fn register_defaults() {
        let text = render_uart();
        assert!(text.contains("#define UART_STATUS_DEFAULT (0x0u)"));
        // direction defaults to member "output" = 1 at bit 0.
        assert!(text.contains("#define UART_CONTROL_DEFAULT (0x1u)"));
    }

    #[test]
    fn struct_pads_address_gaps() {
        let text = render_uart();
        assert!(text.contains("typedef struct uart_regs_t {"));
        assert!(text.contains("  volatile uint32_t status;"));
        // status ends at 0x4, control is pinned at 0x10: three words between.
        assert!(text.contains("  uint32_t _reserved0[3];"));
        assert!(text.contains("  volatile uint32_t control;"));
        assert!(text.contains("  volatile uint32_t samples[4];"));
        assert!(text.contains("} uart_regs_t;"));
    }

    #[test]
    fn constants_become_defines() {
        let text = render_uart();
        assert!(text.contains("#define UART_FIFO_DEPTH (16)"));
    }

    #[test]
    fn keyword_register_name_is_refused() {
        let map = load_str(
            "dut",
            r#"
[[register]]
name = "switch"
mode = "read-write"
"#,
        )
        .unwrap()
        .0;
        let err = render(&map).unwrap_err();
        assert!(err.to_string().contains("`switch` is a C keyword"));
    }

    #[test]
    fn vhdl_reserved_names_are_fine_here() {
        let map = load_str(
            "dut",
            r#"
[[register]]
name = "signal"
mode = "read-only"

[[register.field]]
name = "entity"
width = 4
"#,
        )
        .unwrap()
        .0;
        let text = render(&map).unwrap();
        assert!(text.contains("  volatile uint32_t signal;"));
        assert!(text.contains("#define DUT_SIGNAL_ENTITY_MASK (0xfu)"));
    }

    #[test]
    fn wide_words_use_the_long_long_suffix() {
        let map = load_str(
            "dut",
            r#"
word-width = 64

[[register]]
name = "timestamp"
mode = "read-only"

[[register.field]]
name = "cycles"
width = 40
type = "unsigned"
"#,
        )
        .unwrap()
        .0;
        let text = render(&map).unwrap();
        assert!(text.contains("  volatile uint64_t timestamp;"));
        assert!(text.contains("#define DUT_TIMESTAMP_CYCLES_MASK (0xffffffffffull)"));
    }

    #[test]
    fn oversized_bit_vector_constant_is_refused() {
        let wide = "1".repeat(65);
        let map = load_str(
            "dut",
            &format!(
                r#"
[[constant]]
name = "lane_mask"
value = "0b{wide}"
"#
            ),
        )
        .unwrap()
        .0;
        let err = render(&map).unwrap_err();
        assert!(err.to_string().contains("lane_mask"));
    }

    #[test]
    fn bit_vector_constant_renders_as_hex() {
        let map = load_str(
            "dut",
            r#"
[[constant]]
name = "sync_word"
value = "0b10110000"
"#,
        )
        .unwrap()
        .0;
        let text = render(&map).unwrap();
        assert!(text.contains("#define DUT_SYNC_WORD (0xb0u)"));
    }
}
