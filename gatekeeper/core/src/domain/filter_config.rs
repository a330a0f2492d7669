// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Filter Configuration Types
//
// Defines the configuration schema for one decision filter instance:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Decision service address, base path and transport timeout
// - Cache mode selection
// - Decision mode (policy evaluation or key validation)
// - Extraction, injection and claim-mapping rules

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;

use anyhow::Context;

use crate::domain::cache::CacheMode;
use crate::domain::decision::{DecisionMode, KEY_ID_HEADER};
use crate::domain::path::PathExpression;
use crate::domain::rules::{ExtractionRules, InjectionRule, InjectionRules, InjectionSource};

pub const API_VERSION: &str = "gatekeeper/v1";
pub const KIND: &str = "DecisionFilter";

/// Environment variable overriding `spec.service.address`.
pub const SERVICE_ADDRESS_ENV: &str = "GATEKEEPER_SERVICE_ADDRESS";

/// Top-level Kubernetes-style filter manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfigManifest {
    /// API version (must be "gatekeeper/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "DecisionFilter")
    pub kind: String,

    pub metadata: ManifestMetadata,

    pub spec: FilterConfigSpec,
}

/// Manifest metadata (Kubernetes-style)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

/// Filter specification (content under spec:)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfigSpec {
    /// Required whenever `mode` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceConfig>,

    #[serde(default)]
    pub cache: CacheConfig,

    /// Unset for a claims-only filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ModeConfig>,

    /// Output field → source path (or constant when the value has no '.')
    #[serde(default)]
    pub extract: BTreeMap<String, String>,

    /// Destination path → what to write there
    #[serde(default)]
    pub inject: BTreeMap<String, InjectConfig>,

    /// Destination path → claim path (`payload.name`, `header.typ`).
    /// Read from the bearer token only, never from the decision service.
    /// With a mode set they are applied after an allow; without one, on
    /// every call.
    #[serde(default)]
    pub claims: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Scheme, host and port of the decision service
    pub address: String,

    /// Defaults to the mode's base path when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,

    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds an entry stays valid; 0 = never expires
    #[serde(default = "default_cache_duration")]
    pub duration: u64,

    /// A positive size selects an LRU cache of that capacity
    #[serde(default)]
    pub size: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModeConfig {
    Policy {
        package: String,
        #[serde(default = "default_directive")]
        directive: String,
    },
    KeyValidation {
        #[serde(default = "default_response_path")]
        response_path: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "snake_case")]
pub enum InjectConfig {
    Decision,
    Field { name: String },
    Literal { value: String },
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            duration: default_cache_duration(),
            size: 0,
        }
    }
}

impl From<&InjectConfig> for InjectionSource {
    fn from(config: &InjectConfig) -> Self {
        match config {
            InjectConfig::Decision => InjectionSource::Decision,
            InjectConfig::Field { name } => InjectionSource::Field(name.clone()),
            InjectConfig::Literal { value } => InjectionSource::Literal(value.clone()),
        }
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_cache_duration() -> u64 {
    24 * 3600
}

fn default_directive() -> String {
    crate::domain::decision::DEFAULT_DIRECTIVE.to_string()
}

fn default_response_path() -> String {
    crate::domain::decision::DEFAULT_RESPONSE_PATH.to_string()
}

impl FilterConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read filter config at {:?}", path))?;
        Self::from_yaml_str(&content).with_context(|| format!("Failed to parse filter config at {:?}", path))
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(address) = std::env::var(SERVICE_ADDRESS_ENV) {
            if address.trim().is_empty() {
                tracing::warn!("Ignoring empty {}", SERVICE_ADDRESS_ENV);
                return;
            }
            match self.spec.service.as_mut() {
                Some(service) => {
                    tracing::info!("Environment override: {}={}", SERVICE_ADDRESS_ENV, address);
                    service.address = address;
                }
                None if self.spec.mode.is_some() => {
                    tracing::info!("Environment override: {}={}", SERVICE_ADDRESS_ENV, address);
                    self.spec.service = Some(ServiceConfig {
                        address,
                        base_path: None,
                        timeout: default_timeout(),
                    });
                }
                None => tracing::debug!("No decision mode configured, ignoring {}", SERVICE_ADDRESS_ENV),
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!("Invalid apiVersion: '{}'. Must be '{}'", self.api_version, API_VERSION);
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        match &self.spec.mode {
            None => {
                if self.spec.claims.is_empty() {
                    anyhow::bail!("spec must configure a decision mode, claim mappings, or both");
                }
                if !self.spec.extract.is_empty() || !self.spec.inject.is_empty() {
                    anyhow::bail!("spec.extract and spec.inject need a spec.mode");
                }
            }
            Some(mode) => {
                let service = self
                    .spec
                    .service
                    .as_ref()
                    .context("spec.service is required when spec.mode is set")?;
                let address = service.address.trim();
                if address.is_empty() {
                    anyhow::bail!("spec.service.address cannot be empty");
                }
                url::Url::parse(address)
                    .with_context(|| format!("spec.service.address is not a URL: '{}'", address))?;

                match mode {
                    ModeConfig::Policy { package, directive } => {
                        if package.is_empty() {
                            anyhow::bail!("spec.mode.package cannot be empty");
                        }
                        if directive.is_empty() {
                            anyhow::bail!("spec.mode.directive cannot be empty");
                        }
                    }
                    ModeConfig::KeyValidation { response_path } => {
                        if response_path.is_empty() {
                            anyhow::bail!("spec.mode.response_path cannot be empty");
                        }
                        if self.spec.extract.is_empty() {
                            anyhow::bail!("key validation needs at least one extract rule");
                        }
                    }
                }
            }
        }

        self.extraction_rules()?;
        self.injection_rules()?;
        self.claim_mappings()?;

        Ok(())
    }

    pub fn cache_mode(&self) -> CacheMode {
        CacheMode::select(self.spec.cache.duration, self.spec.cache.size)
    }

    /// `None` for a claims-only filter.
    pub fn decision_mode(&self) -> Option<DecisionMode> {
        self.spec.mode.as_ref().map(|mode| match mode {
            ModeConfig::Policy { package, directive } => DecisionMode::Policy {
                package: package.clone(),
                directive: directive.clone(),
            },
            ModeConfig::KeyValidation { response_path } => DecisionMode::KeyValidation {
                response_path: response_path.clone(),
            },
        })
    }

    fn requires_all_inputs(&self) -> bool {
        self.decision_mode().is_some_and(|mode| mode.requires_all_inputs())
    }

    /// Configured base path, or the mode's default. `None` without a mode.
    pub fn base_path(&self) -> Option<String> {
        let mode = self.decision_mode()?;
        let configured = self.spec.service.as_ref().and_then(|service| service.base_path.clone());
        Some(configured.unwrap_or_else(|| mode.default_base_path().to_string()))
    }

    /// Extraction rules; every rule is required in key validation mode.
    pub fn extraction_rules(&self) -> anyhow::Result<ExtractionRules> {
        let rules = ExtractionRules::parse(self.spec.extract.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .context("Invalid spec.extract rule")?;
        if self.requires_all_inputs() {
            Ok(rules.require_all())
        } else {
            Ok(rules)
        }
    }

    /// Injection rules. Key validation without any configured rule writes
    /// the identity to `X-KeyID`.
    pub fn injection_rules(&self) -> anyhow::Result<InjectionRules> {
        let mut rules = InjectionRules::new();
        for (target, source) in &self.spec.inject {
            let rule = InjectionRule::parse(target, source.into())
                .with_context(|| format!("Invalid spec.inject target '{}'", target))?;
            rules.insert(rule);
        }

        if rules.is_empty() && self.requires_all_inputs() {
            rules.insert(InjectionRule::parse(
                &format!("header.{}", KEY_ID_HEADER),
                InjectionSource::Decision,
            )?);
        }

        Ok(rules)
    }

    /// Destination → claim path, both parsed. Claim paths are read
    /// relative to `jwt.`.
    pub fn claim_mappings(&self) -> anyhow::Result<Vec<(PathExpression, PathExpression)>> {
        self.spec
            .claims
            .iter()
            .map(|(target, claim)| {
                let target = PathExpression::parse_target(target)
                    .with_context(|| format!("Invalid spec.claims target '{}'", target))?;
                let claim = PathExpression::parse(&format!("jwt.{}", claim))
                    .with_context(|| format!("Invalid spec.claims source '{}'", claim))?;
                Ok((target, claim))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::path::Source;
    use std::num::NonZeroUsize;

    const POLICY_YAML: &str = r#"
apiVersion: gatekeeper/v1
kind: DecisionFilter
metadata:
  name: orders
spec:
  service:
    address: http://localhost:8181
    timeout: 2s
  mode:
    type: policy
    package: opa.test
  extract:
    first_name: body.name.first
    subject: jwt.payload.sub
    source: gateway
  inject:
    query.checked: { from: literal, value: "yes" }
"#;

    const KEY_YAML: &str = r#"
apiVersion: gatekeeper/v1
kind: DecisionFilter
metadata:
  name: partners
spec:
  service:
    address: http://localhost:9000
  cache:
    duration: 60
    size: 100
  mode:
    type: key_validation
    response_path: result.id
  extract:
    key: header.Authorization
"#;

    #[test]
    fn test_parse_policy_manifest() {
        let manifest = FilterConfigManifest::from_yaml_str(POLICY_YAML).unwrap();
        manifest.validate().unwrap();

        assert_eq!(manifest.metadata.name, "orders");
        assert_eq!(manifest.spec.service.as_ref().unwrap().timeout, Duration::from_secs(2));
        assert_eq!(manifest.spec.cache, CacheConfig::default());
        assert_eq!(manifest.base_path().as_deref(), Some("/v1/data/"));
        assert_eq!(
            manifest.decision_mode(),
            Some(DecisionMode::Policy {
                package: "opa.test".to_string(),
                directive: "allow".to_string()
            })
        );
        assert_eq!(
            manifest.cache_mode(),
            CacheMode::Expiring {
                ttl: Duration::from_secs(86400)
            }
        );

        let rules = manifest.extraction_rules().unwrap();
        assert_eq!(rules.len(), 3);
        assert!(rules.iter().all(|r| !r.required));
        assert_eq!(manifest.injection_rules().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_key_validation_manifest() {
        let manifest = FilterConfigManifest::from_yaml_str(KEY_YAML).unwrap();
        manifest.validate().unwrap();

        assert_eq!(manifest.base_path().as_deref(), Some("/v1/auth/key"));
        assert_eq!(manifest.spec.service.as_ref().unwrap().timeout, Duration::from_secs(5));
        assert_eq!(
            manifest.cache_mode(),
            CacheMode::Lru {
                capacity: NonZeroUsize::new(100).unwrap()
            }
        );
        assert!(manifest.extraction_rules().unwrap().iter().all(|r| r.required));

        let injections = manifest.injection_rules().unwrap();
        let rule = injections.iter().next().unwrap();
        assert_eq!(rule.target.as_str(), "header.X-KeyID");
        assert_eq!(rule.source, InjectionSource::Decision);
    }

    #[test]
    fn test_validation() {
        let mut manifest = FilterConfigManifest::from_yaml_str(POLICY_YAML).unwrap();
        assert!(manifest.validate().is_ok());

        manifest.api_version = "wrong/v1".to_string();
        assert!(manifest.validate().is_err());
        manifest.api_version = API_VERSION.to_string();

        manifest.kind = "WrongKind".to_string();
        assert!(manifest.validate().is_err());
        manifest.kind = KIND.to_string();

        manifest.spec.service.as_mut().unwrap().address = "".to_string();
        assert!(manifest.validate().is_err());
        manifest.spec.service.as_mut().unwrap().address = "http://localhost:8181".to_string();

        let service = manifest.spec.service.take();
        assert!(manifest.validate().is_err());
        manifest.spec.service = service;

        manifest.spec.extract.insert("bad".to_string(), "cookie.session".to_string());
        assert!(manifest.validate().is_err());
        manifest.spec.extract.remove("bad");

        manifest
            .spec
            .inject
            .insert("jwt.payload.sub".to_string(), InjectConfig::Decision);
        assert!(manifest.validate().is_err());
        manifest.spec.inject.remove("jwt.payload.sub");

        manifest
            .spec
            .inject
            .insert("header".to_string(), InjectConfig::Decision);
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_key_validation_requires_extract_rules() {
        let mut manifest = FilterConfigManifest::from_yaml_str(KEY_YAML).unwrap();
        manifest.spec.extract.clear();
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_claim_mappings() {
        let mut manifest = FilterConfigManifest::from_yaml_str(POLICY_YAML).unwrap();
        manifest
            .spec
            .claims
            .insert("header.X-User".to_string(), "payload.name".to_string());

        let mappings = manifest.claim_mappings().unwrap();
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].0.source(), Source::Header);
        assert_eq!(mappings[0].1.as_str(), "jwt.payload.name");

        manifest
            .spec
            .claims
            .insert("header.X-Bad".to_string(), "signature".to_string());
        assert!(manifest.claim_mappings().is_err());
    }

    const CLAIMS_YAML: &str = r#"
apiVersion: gatekeeper/v1
kind: DecisionFilter
metadata:
  name: profile
spec:
  claims:
    header.X-User: payload.name
"#;

    #[test]
    fn test_claims_only_manifest() {
        let manifest = FilterConfigManifest::from_yaml_str(CLAIMS_YAML).unwrap();
        manifest.validate().unwrap();

        assert!(manifest.spec.service.is_none());
        assert_eq!(manifest.decision_mode(), None);
        assert_eq!(manifest.base_path(), None);
        assert!(manifest.extraction_rules().unwrap().is_empty());
        assert!(manifest.injection_rules().unwrap().is_empty());
        assert_eq!(manifest.claim_mappings().unwrap().len(), 1);
    }

    #[test]
    fn test_manifest_without_mode_or_claims_is_invalid() {
        let mut manifest = FilterConfigManifest::from_yaml_str(CLAIMS_YAML).unwrap();
        manifest.spec.claims.clear();
        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("decision mode"));
    }

    #[test]
    fn test_extract_rules_need_a_mode() {
        let mut manifest = FilterConfigManifest::from_yaml_str(CLAIMS_YAML).unwrap();
        manifest.spec.extract.insert("key".to_string(), "header.X-API-Key".to_string());
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let manifest = FilterConfigManifest::from_yaml_str(KEY_YAML).unwrap();
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), manifest.to_yaml_string().unwrap()).unwrap();

        let parsed = FilterConfigManifest::from_yaml_file(file.path()).unwrap();
        assert_eq!(parsed.metadata.name, "partners");
        assert_eq!(parsed.spec.mode, manifest.spec.mode);
        assert_eq!(parsed.spec.cache, manifest.spec.cache);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = FilterConfigManifest::from_yaml_file("/nonexistent/filter.yaml").unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/filter.yaml"));
    }
}
