//! Generation pipeline: validation gate, then per-artifact fan-out.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use regmill_core::RegisterMap;

use crate::error::{EmitError, PipelineError};
use crate::report::{ArtifactOutcome, ArtifactStatus, GenerationReport};
use crate::writer::write_if_changed;
use crate::{c, html, vhdl};

/// One kind of generated output.
///
/// Kinds are configuration data: enabling or disabling a target is a flag
/// on [`EmitConfig`], never a code change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ArtifactKind {
    /// VHDL package with addresses, field ranges, records, and defaults.
    RegisterPackage,
    /// VHDL register file with bus address decode.
    BusWrapper,
    /// C header for software access.
    CHeader,
    /// Human-readable HTML documentation.
    HtmlPage,
}

impl ArtifactKind {
    /// Every kind, in emission order.
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::RegisterPackage,
        ArtifactKind::BusWrapper,
        ArtifactKind::CHeader,
        ArtifactKind::HtmlPage,
    ];

    /// The artifact's path below the output root.
    ///
    /// Hardware sources live under `<map>/hdl/`; software and documentation
    /// land next to it in `<map>/`.
    pub fn relative_path(self, map_name: &str) -> PathBuf {
        let base = PathBuf::from(map_name);
        match self {
            ArtifactKind::RegisterPackage => {
                base.join("hdl").join(format!("{map_name}_regs_pkg.vhd"))
            }
            ArtifactKind::BusWrapper => base.join("hdl").join(format!("{map_name}_reg_file.vhd")),
            ArtifactKind::CHeader => base.join(format!("{map_name}_regs.h")),
            ArtifactKind::HtmlPage => base.join(format!("{map_name}_regs.html")),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArtifactKind::RegisterPackage => "register-package",
            ArtifactKind::BusWrapper => "bus-wrapper",
            ArtifactKind::CHeader => "c-header",
            ArtifactKind::HtmlPage => "html-page",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "register-package" => Ok(ArtifactKind::RegisterPackage),
            "bus-wrapper" => Ok(ArtifactKind::BusWrapper),
            "c-header" => Ok(ArtifactKind::CHeader),
            "html-page" => Ok(ArtifactKind::HtmlPage),
            other => Err(format!(
                "unknown artifact kind `{other}` (expected register-package, bus-wrapper, c-header, or html-page)"
            )),
        }
    }
}

/// What to generate and where.
#[derive(Debug, Clone)]
pub struct EmitConfig {
    /// Root directory; each map gets its own subtree underneath.
    pub output_root: PathBuf,
    /// Artifact kinds to produce.
    pub kinds: BTreeSet<ArtifactKind>,
}

impl EmitConfig {
    /// Generate every artifact kind under `output_root`.
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            kinds: ArtifactKind::ALL.into_iter().collect(),
        }
    }

    /// Generate only the given kinds under `output_root`.
    pub fn with_kinds(
        output_root: impl Into<PathBuf>,
        kinds: impl IntoIterator<Item = ArtifactKind>,
    ) -> Self {
        Self {
            output_root: output_root.into(),
            kinds: kinds.into_iter().collect(),
        }
    }
}

/// Compile a validated register map into its artifacts.
///
/// Every selected emitter sees the same immutable model exactly once. A
/// failing artifact is recorded and the rest still run; only validation
/// failure aborts the whole run, before anything touches the filesystem.
pub fn generate(
    map: &RegisterMap,
    config: &EmitConfig,
) -> Result<GenerationReport, PipelineError> {
    // Stage 1: validation gate.
    regmill_check::validate(map).map_err(|violations| PipelineError::ValidationFailed {
        name: map.name.clone(),
        violations,
    })?;

    // Stage 2: independent fan-out, all outcomes collected.
    let artifacts = config
        .kinds
        .iter()
        .map(|kind| emit_one(map, *kind, &config.output_root))
        .collect();

    Ok(GenerationReport {
        map_name: map.name.clone(),
        fingerprint: map.fingerprint(),
        artifacts,
    })
}

fn emit_one(map: &RegisterMap, kind: ArtifactKind, output_root: &Path) -> ArtifactOutcome {
    let path = output_root.join(kind.relative_path(&map.name));
    let status = match render(map, kind).and_then(|text| write_artifact(&path, &text)) {
        Ok(status) => status,
        Err(e) => ArtifactStatus::Failed(e),
    };
    ArtifactOutcome { kind, path, status }
}

/// Render one artifact to text without touching the filesystem.
pub fn render(map: &RegisterMap, kind: ArtifactKind) -> Result<String, EmitError> {
    match kind {
        ArtifactKind::RegisterPackage => vhdl::pkg::render(map),
        ArtifactKind::BusWrapper => vhdl::wrapper::render(map),
        ArtifactKind::CHeader => c::render(map),
        ArtifactKind::HtmlPage => html::render(map),
    }
}

fn write_artifact(path: &Path, text: &str) -> Result<ArtifactStatus, EmitError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| EmitError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    if write_if_changed(path, text)? {
        Ok(ArtifactStatus::Written)
    } else {
        Ok(ArtifactStatus::Unchanged)
    }
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
mode = "write-pulse"

[[register.field]]
name = "reset_core"
width = 1
"#;

    fn uart_map() -> RegisterMap {
        load_str("uart", UART).unwrap().0
    }

    #[test]
    fn artifact_paths_follow_layout() {
        assert_eq!(
            ArtifactKind::RegisterPackage.relative_path("uart"),
            PathBuf::from("uart/hdl/uart_regs_pkg.vhd")
        );
        assert_eq!(
            ArtifactKind::BusWrapper.relative_path("uart"),
            PathBuf::from("uart/hdl/uart_reg_file.vhd")
        );
        assert_eq!(
            ArtifactKind::CHeader.relative_path("uart"),
            PathBuf::from("uart/uart_regs.h")
        );
        assert_eq!(
            ArtifactKind::HtmlPage.relative_path("uart"),
            PathBuf::from("uart/uart_regs.html")
        );
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in ArtifactKind::ALL {
            assert_eq!(kind.to_string().parse::<ArtifactKind>().unwrap(), kind);
        }
        assert!("verilog".parse::<ArtifactKind>().is_err());
    }

    #[test]
    fn generates_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let report = generate(&uart_map(), &EmitConfig::new(dir.path())).unwrap();
        assert!(report.all_succeeded());
        assert_eq!(report.written(), 4);
        assert!(dir.path().join("uart/hdl/uart_regs_pkg.vhd").exists());
        assert!(dir.path().join("uart/hdl/uart_reg_file.vhd").exists());
        assert!(dir.path().join("uart/uart_regs.h").exists());
        assert!(dir.path().join("uart/uart_regs.html").exists());
    }

    #[test]
    fn second_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let map = uart_map();
        let config = EmitConfig::new(dir.path());
        let first = generate(&map, &config).unwrap();
        assert_eq!(first.written(), 4);
        let second = generate(&map, &config).unwrap();
        assert_eq!(second.written(), 0);
        assert!(second
            .artifacts
            .iter()
            .all(|a| matches!(a.status, ArtifactStatus::Unchanged)));
    }

    #[test]
    fn kind_selection_limits_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = EmitConfig::with_kinds(dir.path(), [ArtifactKind::CHeader]);
        let report = generate(&uart_map(), &config).unwrap();
        assert_eq!(report.artifacts.len(), 1);
        assert!(dir.path().join("uart/uart_regs.h").exists());
        assert!(!dir.path().join("uart/hdl").exists());
    }

    #[test]
    fn invalid_map_never_reaches_the_filesystem() {
        let text = r#"
name = "dup"

[[register]]
name = "a"
mode = "read-write"
address = 0

[[register]]
name = "b"
mode = "read-write"
address = 0
"#;
        let map = load_str("dup", text).unwrap().0;
        let dir = tempfile::tempdir().unwrap();
        let err = generate(&map, &EmitConfig::new(dir.path())).unwrap_err();
        let PipelineError::ValidationFailed { name, violations } = err;
        assert_eq!(name, "dup");
        assert!(violations
            .iter()
            .any(|v| v.to_string().contains("`a`") && v.to_string().contains("`b`")));
        assert!(!dir.path().join("dup").exists());
    }

    #[test]
    fn vhdl_reserved_name_fails_only_hdl_artifacts() {
        // `signal` is reserved in VHDL but a fine C identifier.
        let text = r#"
name = "dsp"

[[register]]
name = "signal"
mode = "read-write"

[[register.field]]
name = "level"
width = 8
"#;
        let map = load_str("dsp", text).unwrap().0;
        let dir = tempfile::tempdir().unwrap();
        let report = generate(&map, &EmitConfig::new(dir.path())).unwrap();
        assert_eq!(report.failed(), 2);
        for a in &report.artifacts {
            match a.kind {
                ArtifactKind::RegisterPackage | ArtifactKind::BusWrapper => {
                    assert!(matches!(a.status, ArtifactStatus::Failed(_)), "{:?}", a.kind);
                }
                ArtifactKind::CHeader | ArtifactKind::HtmlPage => {
                    assert!(matches!(a.status, ArtifactStatus::Written), "{:?}", a.kind);
                }
            }
        }
        assert!(dir.path().join("dsp/dsp_regs.h").exists());
        assert!(!dir.path().join("dsp/hdl/dsp_regs_pkg.vhd").exists());
    }

    #[test]
    fn artifacts_agree_on_addresses_and_shifts() {
        let text = r#"
name = "dut"

[[register]]
name = "config"
mode = "read-write"

[[register.field]]
name = "enable"
width = 1

[[register.field]]
name = "prescale"
width = 10

[[register]]
name = "irq"
mode = "write-pulse"
address = 0x40

[[register.field]]
name = "clear"
width = 1

[[register]]
name = "buffers"
mode = "read-only"
count = 3

[[register.field]]
name = "word"
width = 32
type = "unsigned"
"#;
        let map = load_str("dut", text).unwrap().0;
        let pkg = render(&map, ArtifactKind::RegisterPackage).unwrap();
        let header = render(&map, ArtifactKind::CHeader).unwrap();
        let page = render(&map, ArtifactKind::HtmlPage).unwrap();

        for r in &map.registers {
            let upper = r.name.to_uppercase();
            assert!(
                pkg.contains(&format!(
                    "constant dut_{}_address : natural := {};",
                    r.name, r.address
                )),
                "{} address missing from the package",
                r.name
            );
            let c_define = if r.is_array() {
                format!("#define DUT_{upper}_BASE_ADDRESS ({:#x}u)", r.address)
            } else {
                format!("#define DUT_{upper}_ADDRESS ({:#x}u)", r.address)
            };
            assert!(header.contains(&c_define), "{} address missing from the header", r.name);
            assert!(
                page.contains(&format!("<td>{:#x}</td>", r.address)),
                "{} address missing from the page",
                r.name
            );

            for f in &r.fields {
                assert!(pkg.contains(&format!(
                    "constant dut_{}_{}_shift : natural := {};",
                    r.name,
                    f.name,
                    f.lsb()
                )));
                assert!(header.contains(&format!(
                    "#define DUT_{upper}_{}_SHIFT ({}u)",
                    f.name.to_uppercase(),
                    f.lsb()
                )));
            }
        }
    }
}
