//! The bus-interface wrapper: a synchronous register file with generated
//! address decode.
//!
//! Decode is total. Writes to unmapped addresses assert no enable; reads
//! of unmapped addresses return zeros, with `read_valid` still answering.
//! Write-pulse registers arm on the rising edge of `write_enable`, so one
//! bus transaction reaches hardware for exactly one cycle however long the
//! strobe is held. Register arrays decode by index range rather than one
//! comparator per element.

use regmill_core::{AccessMode, Register, RegisterMap};

use crate::error::Result;
use crate::vhdl::{check_identifiers, file_header};

/// Render `<map>_reg_file.vhd`.
pub fn render(map: &RegisterMap) -> Result<String> {
    check_identifiers(map, "bus-wrapper")?;

    let p = &map.name;
    let writable: Vec<&Register> = map
        .registers
        .iter()
        .filter(|r| r.mode.bus_writable())
        .collect();
    let level_writable: Vec<&Register> = map
        .registers
        .iter()
        .filter(|r| matches!(r.mode, AccessMode::ReadWrite | AccessMode::WriteOnly))
        .collect();
    let pulsed: Vec<&Register> = map
        .registers
        .iter()
        .filter(|r| r.mode == AccessMode::WritePulse)
        .collect();
    let readable: Vec<&Register> = map
        .registers
        .iter()
        .filter(|r| r.mode.bus_readable())
        .collect();
    let has_pulse = !pulsed.is_empty();

    let mut v: Vec<String> = Vec::new();
    v.push(file_header(map));
    v.push(String::new());
    v.push("library ieee;".into());
    v.push("use ieee.std_logic_1164.all;".into());
    v.push("use ieee.numeric_std.all;".into());
    v.push(String::new());
    v.push(format!("use work.{p}_regs_pkg.all;"));
    v.push(String::new());

    // Entity: fixed bus ports, then one value port per register.
    let mut ports: Vec<String> = vec![
        "clk : in std_logic".into(),
        "reset : in std_logic".into(),
        "write_enable : in std_logic".into(),
        format!("write_address : in unsigned({p}_address_bits - 1 downto 0)"),
        format!("write_data : in std_logic_vector({p}_word_width - 1 downto 0)"),
        "read_enable : in std_logic".into(),
        format!("read_address : in unsigned({p}_address_bits - 1 downto 0)"),
        format!("read_data : out std_logic_vector({p}_word_width - 1 downto 0)"),
        "read_valid : out std_logic".into(),
    ];
    for r in &map.registers {
        let ty = value_type(p, r);
        match r.mode {
            AccessMode::ReadOnly => ports.push(format!("{}_value : in {ty}", r.name)),
            AccessMode::ReadWrite | AccessMode::WriteOnly => {
                ports.push(format!("{}_value : out {ty}", r.name))
            }
            AccessMode::WritePulse => {
                ports.push(format!("{}_value : out {ty}", r.name));
                ports.push(format!("{}_written : out std_logic", r.name));
            }
        }
    }
    v.push(format!("entity {p}_reg_file is"));
    v.push("  port (".into());
    for (i, port) in ports.iter().enumerate() {
        let sep = if i + 1 == ports.len() { "" } else { ";" };
        v.push(format!("    {port}{sep}"));
    }
    v.push("  );".into());
    v.push("end entity;".into());
    v.push(String::new());

    v.push(format!("architecture rtl of {p}_reg_file is"));
    if has_pulse {
        v.push("  signal write_enable_q : std_logic := '0';".into());
    }
    for r in &writable {
        if r.is_array() {
            v.push(format!(
                "  type {}_stored_t is array (0 to {p}_{}_array_length - 1) of std_logic_vector({p}_word_width - 1 downto 0);",
                r.name, r.name
            ));
            v.push(format!(
                "  signal {}_stored : {}_stored_t := (others => {p}_{}_default);",
                r.name, r.name, r.name
            ));
        } else {
            v.push(format!(
                "  signal {}_stored : std_logic_vector({p}_word_width - 1 downto 0) := {p}_{}_default;",
                r.name, r.name
            ));
        }
    }
    v.push("begin".into());

    if !writable.is_empty() {
        v.push(String::new());
        for r in &writable {
            if r.is_array() {
                v.push(format!(
                    "  {}_convert : for i in 0 to {p}_{}_array_length - 1 generate",
                    r.name, r.name
                ));
                v.push(format!(
                    "    {}_value(i) <= to_{p}_{}_t({}_stored(i));",
                    r.name, r.name, r.name
                ));
                v.push("  end generate;".into());
            } else {
                v.push(format!("  {}_value <= to_{p}_{}_t({}_stored);", r.name, r.name, r.name));
            }
        }
    }

    if !writable.is_empty() {
        v.push(String::new());
        v.push("  write_regs : process(clk)".into());
        v.push("  begin".into());
        v.push("    if rising_edge(clk) then".into());
        v.push("      if reset = '1' then".into());
        if has_pulse {
            v.push("        write_enable_q <= '0';".into());
        }
        for r in &writable {
            if r.is_array() {
                v.push(format!("        {}_stored <= (others => {p}_{}_default);", r.name, r.name));
            } else {
                v.push(format!("        {}_stored <= {p}_{}_default;", r.name, r.name));
            }
        }
        for r in &pulsed {
            v.push(format!("        {}_written <= '0';", r.name));
        }
        v.push("      else".into());
        if has_pulse {
            v.push("        write_enable_q <= write_enable;".into());
            v.push(String::new());
            v.push("        -- Write-pulse registers revert unless written this cycle.".into());
            for r in &pulsed {
                if r.is_array() {
                    v.push(format!("        {}_stored <= (others => {p}_{}_default);", r.name, r.name));
                } else {
                    v.push(format!("        {}_stored <= {p}_{}_default;", r.name, r.name));
                }
                v.push(format!("        {}_written <= '0';", r.name));
            }
        }
        if !level_writable.is_empty() {
            v.push(String::new());
            v.push("        if write_enable = '1' then".into());
            push_decode(
                &mut v,
                "          ",
                level_writable.iter().map(|r| {
                    (match_cond(p, r, "write"), vec![store_line(p, r)])
                }),
            );
            v.push("        end if;".into());
        }
        if has_pulse {
            v.push(String::new());
            v.push("        -- Pulse decode arms only on the strobe's rising edge.".into());
            v.push("        if write_enable = '1' and write_enable_q = '0' then".into());
            push_decode(
                &mut v,
                "          ",
                pulsed.iter().map(|r| {
                    (
                        match_cond(p, r, "write"),
                        vec![store_line(p, r), format!("{}_written <= '1';", r.name)],
                    )
                }),
            );
            v.push("        end if;".into());
        }
        v.push("      end if;".into());
        v.push("    end if;".into());
        v.push("  end process;".into());
    }

    v.push(String::new());
    v.push("  read_regs : process(clk)".into());
    v.push("  begin".into());
    v.push("    if rising_edge(clk) then".into());
    v.push("      if reset = '1' then".into());
    v.push("        read_data <= (others => '0');".into());
    v.push("        read_valid <= '0';".into());
    v.push("      else".into());
    v.push("        read_valid <= read_enable;".into());
    v.push("        -- No register selected reads as zeros.".into());
    v.push("        read_data <= (others => '0');".into());
    if !readable.is_empty() {
        v.push("        if read_enable = '1' then".into());
        push_decode(
            &mut v,
            "          ",
            readable.iter().map(|r| {
                (match_cond(p, r, "read"), vec![read_line(p, r)])
            }),
        );
        v.push("        end if;".into());
    }
    v.push("      end if;".into());
    v.push("    end if;".into());
    v.push("  end process;".into());
    v.push(String::new());
    v.push("end architecture;".into());

    Ok(v.join("\n") + "\n")
}

fn value_type(p: &str, r: &Register) -> String {
    if r.is_array() {
        format!("{p}_{}_array_t", r.name)
    } else {
        format!("{p}_{}_t", r.name)
    }
}

/// Address match for one register: equality for scalars, an index range
/// for arrays.
fn match_cond(p: &str, r: &Register, bus: &str) -> String {
    if r.is_array() {
        format!(
            "to_integer({bus}_address) >= {p}_{}_address and to_integer({bus}_address) < {p}_{}_end_address",
            r.name, r.name
        )
    } else {
        format!("to_integer({bus}_address) = {p}_{}_address", r.name)
    }
}

fn element_index(p: &str, r: &Register, bus: &str) -> String {
    format!(
        "(to_integer({bus}_address) - {p}_{}_address) / {p}_word_bytes",
        r.name
    )
}

fn store_line(p: &str, r: &Register) -> String {
    if r.is_array() {
        format!("{}_stored({}) <= write_data;", r.name, element_index(p, r, "write"))
    } else {
        format!("{}_stored <= write_data;", r.name)
    }
}

fn read_line(p: &str, r: &Register) -> String {
    match (r.mode, r.is_array()) {
        (AccessMode::ReadOnly, false) => format!("read_data <= to_slv({}_value);", r.name),
        (AccessMode::ReadOnly, true) => format!(
            "read_data <= to_slv({}_value({}));",
            r.name,
            element_index(p, r, "read")
        ),
        (_, false) => format!("read_data <= {}_stored;", r.name),
        (_, true) => format!(
            "read_data <= {}_stored({});",
            r.name,
            element_index(p, r, "read")
        ),
    }
}

fn push_decode(
    v: &mut Vec<String>,
    indent: &str,
    arms: impl IntoIterator<Item = (String, Vec<String>)>,
) {
    let mut first = true;
    for (cond, body) in arms {
        let kw = if first { "if" } else { "elsif" };
        first = false;
        v.push(format!("{indent}{kw} {cond} then"));
        for line in body {
            v.push(format!("{indent}  {line}"));
        }
    }
    if !first {
        v.push(format!("{indent}end if;"));
    }
}
