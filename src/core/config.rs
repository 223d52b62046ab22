use crate::defaults::{self, Defaults};
use crate::error::Error;
use crate::naming::Identifier;
use crate::paths;
use crate::refactor::DEFAULT_CONTENT_EXTENSIONS;
use crate::utils::template::{self, TemplateVars};
use crate::utils::io;
use crate::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// JSON Parsing Utilities (internal)
// ============================================================================

/// Parse JSON string into typed value.
pub(crate) fn from_str<T: DeserializeOwned>(s: &str, path: &Path) -> Result<T> {
    serde_json::from_str(s).map_err(|e| Error::config_invalid_json(path.display().to_string(), e))
}

/// Serialize value to pretty-printed JSON string.
pub(crate) fn to_string_pretty<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data)
        .map_err(|e| Error::internal_json(e.to_string(), Some("serialize json".to_string())))
}

// ============================================================================
// Scaffold configuration
// ============================================================================

/// Everything an operation needs to know about one solution checkout.
///
/// Persisted as `svcgen.json` at the solution root. String fields may contain
/// `{{solution}}`, `{{service}}` and `{{serviceKebab}}` placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaffoldConfig {
    /// Solution name; also the `.sln` file stem. Discovered when empty.
    #[serde(default)]
    pub solution_name: String,

    /// Solution root. Not persisted; always the directory the file was read from.
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default = "defaults::default_services_dir")]
    pub services_dir: String,

    /// Service copied by `new`, named as an identifier (`User` → `services/user`).
    #[serde(default = "defaults::default_template_service")]
    pub template_service: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_repo: Option<String>,

    #[serde(default = "default_composition_file")]
    pub composition_file: String,

    #[serde(default = "default_apphost_project")]
    pub apphost_project: String,

    #[serde(default = "default_registration_pattern")]
    pub registration_pattern: String,

    #[serde(default = "default_registration_line")]
    pub registration_line: String,

    #[serde(default = "default_registration_anchor")]
    pub registration_anchor: String,

    #[serde(default = "default_host_project_suffix")]
    pub host_project_suffix: String,

    #[serde(default = "default_content_extensions")]
    pub content_extensions: Vec<String>,

    #[serde(default)]
    pub ignore: Vec<String>,
}

fn default_composition_file() -> String {
    "aspire/{{solution}}.AppHost/Program.cs".to_string()
}

fn default_apphost_project() -> String {
    "aspire/{{solution}}.AppHost/{{solution}}.AppHost.csproj".to_string()
}

fn default_registration_pattern() -> String {
    "Projects.{{solution}}_{{service}}Service_".to_string()
}

fn default_registration_line() -> String {
    r#"builder.AddProject<Projects.{{solution}}_{{service}}Service_HttpApi_Host>("{{serviceKebab}}-service");"#
        .to_string()
}

fn default_registration_anchor() -> String {
    "builder.Build().Run();".to_string()
}

fn default_host_project_suffix() -> String {
    ".HttpApi.Host.csproj".to_string()
}

fn default_content_extensions() -> Vec<String> {
    DEFAULT_CONTENT_EXTENSIONS
        .iter()
        .map(|e| e.to_string())
        .collect()
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            solution_name: String::new(),
            root: PathBuf::new(),
            services_dir: defaults::default_services_dir(),
            template_service: defaults::default_template_service(),
            template_repo: None,
            composition_file: default_composition_file(),
            apphost_project: default_apphost_project(),
            registration_pattern: default_registration_pattern(),
            registration_line: default_registration_line(),
            registration_anchor: default_registration_anchor(),
            host_project_suffix: default_host_project_suffix(),
            content_extensions: default_content_extensions(),
            ignore: Vec::new(),
        }
    }
}

impl ScaffoldConfig {
    /// A fresh config for `root`, seeded from user-level defaults.
    pub fn from_defaults(root: &Path, solution_name: &str, defaults: &Defaults) -> Self {
        Self {
            solution_name: solution_name.to_string(),
            root: root.to_path_buf(),
            services_dir: defaults.services_dir.clone(),
            template_service: defaults.template_service.clone(),
            template_repo: defaults.template_repo.clone(),
            ignore: defaults.ignore.clone(),
            ..Self::default()
        }
    }

    /// Load `svcgen.json` from `root`, or fall back to defaults.
    ///
    /// An empty solution name is discovered from the single `.sln`/`.slnx` file
    /// in `root`.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::project_config(root);

        let mut config: ScaffoldConfig = if path.exists() {
            let content = io::read_file(&path, &format!("read {}", path.display()))?;
            from_str(&content, &path)?
        } else {
            ScaffoldConfig::default()
        };
        config.root = root.to_path_buf();

        if config.solution_name.trim().is_empty() {
            config.solution_name = discover_solution_name(root)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Write `svcgen.json` atomically.
    pub fn save(&self) -> Result<()> {
        let path = paths::project_config(&self.root);
        let content = to_string_pretty(self)?;
        io::write_file_atomic(&path, &format!("{}\n", content), "write svcgen.json")
    }

    pub fn validate(&self) -> Result<()> {
        self.solution()?;
        self.template()?;

        if self.services_dir.trim().is_empty() || Path::new(&self.services_dir).is_absolute() {
            return Err(Error::config_invalid_value(
                "services_dir",
                Some(self.services_dir.clone()),
                "Must be a relative path under the solution root",
            ));
        }

        if self.registration_anchor.trim().is_empty() {
            return Err(Error::config_invalid_value(
                "registration_anchor",
                None,
                "Anchor cannot be empty",
            ));
        }

        Ok(())
    }

    pub fn solution(&self) -> Result<Identifier> {
        Identifier::adopt(&self.solution_name).ok_or_else(|| {
            Error::config_invalid_value(
                "solution_name",
                Some(self.solution_name.clone()),
                "Solution name must be letters and digits only",
            )
        })
    }

    pub fn template(&self) -> Result<Identifier> {
        Identifier::adopt(&self.template_service).ok_or_else(|| {
            Error::config_invalid_value(
                "template_service",
                Some(self.template_service.clone()),
                "Template service must be letters and digits only",
            )
        })
    }

    /// The config as it is after the solution is renamed to `new`.
    pub fn renamed(&self, new: &Identifier) -> Self {
        Self {
            solution_name: new.to_string(),
            ..self.clone()
        }
    }

    pub fn services_path(&self) -> PathBuf {
        self.root.join(&self.services_dir)
    }

    /// Folder of a service: `services/<kebab-name>`.
    pub fn service_dir(&self, service: &Identifier) -> PathBuf {
        self.services_path().join(service.kebab())
    }

    pub fn template_dir(&self) -> Result<PathBuf> {
        Ok(self.service_dir(&self.template()?))
    }

    /// `<root>/<solution>.sln`, or `.slnx` when only that exists.
    pub fn solution_file(&self) -> PathBuf {
        let sln = self.root.join(format!("{}.sln", self.solution_name));
        let slnx = self.root.join(format!("{}.slnx", self.solution_name));
        if !sln.exists() && slnx.exists() {
            slnx
        } else {
            sln
        }
    }

    pub fn composition_path(&self) -> PathBuf {
        self.root.join(self.render(&self.composition_file, None))
    }

    pub fn apphost_project_path(&self) -> PathBuf {
        self.root.join(self.render(&self.apphost_project, None))
    }

    /// Render a configured template with the solution and (optionally) service names.
    pub fn render(&self, template_str: &str, service: Option<&Identifier>) -> String {
        let kebab = service.map(|s| s.kebab()).unwrap_or_default();
        let name = service.map(|s| s.as_str()).unwrap_or_default();
        template::render(
            template_str,
            &[
                (TemplateVars::SOLUTION, self.solution_name.as_str()),
                (TemplateVars::SERVICE, name),
                (TemplateVars::SERVICE_KEBAB, kebab.as_str()),
                (TemplateVars::SERVICES_DIR, self.services_dir.as_str()),
            ],
        )
    }

    /// Path relative to the root, `/`-separated, for reports.
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

/// Find the solution name from the one `.sln`/`.slnx` file in `root`.
pub fn discover_solution_name(root: &Path) -> Result<String> {
    let entries = std::fs::read_dir(root).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("read {}", root.display())))
    })?;

    let mut stems: Vec<String> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            matches!(
                p.extension().and_then(|e| e.to_str()),
                Some("sln") | Some("slnx")
            )
        })
        .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().to_string()))
        .collect();
    stems.sort();
    stems.dedup();

    match stems.len() {
        1 => Ok(stems.remove(0)),
        0 => Err(Error::config_missing_key(
            "solution_name",
            Some(paths::project_config(root).display().to_string()),
        )
        .with_hint("No .sln file found; run from the solution root or pass --root")),
        _ => Err(Error::config_invalid_value(
            "solution_name",
            Some(stems.join(", ")),
            "Multiple solution files found; set solution_name in svcgen.json",
        )),
    }
}
