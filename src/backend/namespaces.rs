//! Resolve type tokens to C# namespaces and collect `using` directives.
//!
//! A token has the shape `package:module:member` (e.g. `aws:s3/bucket:Bucket`). The resolver maps it onto a qualified
//! C# type name (`Aws.S3.Bucket`) using per-package namespace metadata supplied by the caller, falling back to
//! title-casing when the metadata has no entry.
//!
//! ## Notes
//! - `pulumi:providers:<pkg>` tokens name a package's provider resource: package `<pkg>`, member `Provider`.
//! - Module `index` (or an empty module) is the package root namespace.
//! - A trailing module segment that repeats the member name (`s3/bucket:Bucket`) is dropped.
//! - Malformed tokens never abort generation: the raw token is used as the type name and an error diagnostic is
//!   reported.
//!
//! ## See also
//! - `emit/program.rs`: import collection over a whole program

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use stackgen_core::strings::title;

use crate::diagnostics::Diagnostic;
use crate::ir::SourceSpan;

/// Opaque per-package namespace metadata.
///
/// Keys are either the package name itself (its root namespace alias) or a dotted module path within the package.
pub trait NamespaceMetadata {
    fn lookup(&self, package: &str, key: &str) -> Option<&str>;
}

/// JSON-loadable namespace metadata: `{ "aws": { "aws": "Aws", "s3": "S3", "ec2": "Ec2" } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageNamespaces(BTreeMap<String, BTreeMap<String, String>>);

impl PackageNamespaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one mapping, builder-style.
    pub fn with(mut self, package: &str, key: &str, namespace: &str) -> Self {
        self.insert(package, key, namespace);
        self
    }

    pub fn insert(&mut self, package: &str, key: &str, namespace: &str) {
        self.0
            .entry(package.to_string())
            .or_default()
            .insert(key.to_string(), namespace.to_string());
    }
}

impl NamespaceMetadata for PackageNamespaces {
    fn lookup(&self, package: &str, key: &str) -> Option<&str> {
        self.0.get(package)?.get(key).map(String::as_str)
    }
}

/// A resolved, qualified C# type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    /// Source package name (`aws`); empty for unresolvable tokens.
    pub package: String,
    /// Root namespace alias (`Aws`).
    pub root: String,
    /// Module namespace below the root (`S3`, `Ec2.Transit`), if any.
    pub module: Option<String>,
    /// Title-cased member (`Bucket`).
    pub member: String,
}

impl TypeName {
    /// A name used verbatim, for tokens that could not be decomposed.
    fn raw(token: &str) -> Self {
        Self {
            package: String::new(),
            root: String::new(),
            module: None,
            member: token.to_string(),
        }
    }

    /// `Root.Module.Member`, skipping empty parts.
    pub fn qualified(&self) -> String {
        [Some(self.root.as_str()), self.module.as_deref(), Some(self.member.as_str())]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// The `using Alias = Runtime.Alias` directive this name needs, if it belongs to a package.
    pub fn package_using(&self, runtime_namespace: &str) -> Option<String> {
        (!self.root.is_empty()).then(|| format!("{0} = {runtime_namespace}.{0}", self.root))
    }
}

/// Split a token into `(package, module, member)`.
pub fn decompose_token(token: &str) -> Option<(&str, &str, &str)> {
    let mut parts = token.split(':');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(package), Some(module), Some(member), None) if !package.is_empty() && !member.is_empty() => {
            Some((package, module, member))
        }
        _ => None,
    }
}

/// Resolve a resource token. Provider tokens resolve to the package's `Provider` member.
pub fn resolve_resource(
    token: &str,
    metadata: &dyn NamespaceMetadata,
    span: Option<&SourceSpan>,
) -> (TypeName, Option<Diagnostic>) {
    match decompose_token(token) {
        Some(("pulumi", "providers", package)) => (resolve_parts(package, "", "Provider", metadata), None),
        Some((package, module, member)) => (resolve_parts(package, module, member, metadata), None),
        None => malformed(token, span),
    }
}

/// Resolve a function token (the first argument of `invoke`).
pub fn resolve_function(
    token: &str,
    metadata: &dyn NamespaceMetadata,
    span: Option<&SourceSpan>,
) -> (TypeName, Option<Diagnostic>) {
    match decompose_token(token) {
        Some((package, module, member)) => (resolve_parts(package, module, member, metadata), None),
        None => malformed(token, span),
    }
}

fn malformed(token: &str, span: Option<&SourceSpan>) -> (TypeName, Option<Diagnostic>) {
    let diagnostic = Diagnostic::error(format!("invalid token `{token}`"))
        .with_detail("tokens have the form package:module:member")
        .with_span(span.cloned());
    (TypeName::raw(token), Some(diagnostic))
}

fn resolve_parts(package: &str, module: &str, member: &str, metadata: &dyn NamespaceMetadata) -> TypeName {
    let module = match module.rsplit_once('/') {
        Some((parent, last)) if last.eq_ignore_ascii_case(member) => parent,
        _ => module,
    };

    let root = metadata
        .lookup(package, package)
        .map_or_else(|| title(package), str::to_string);

    let module = if module.is_empty() || module == "index" {
        None
    } else {
        let key = module.replace('/', ".");
        Some(
            metadata
                .lookup(package, &key)
                .map_or_else(|| key.split('.').map(title).collect::<Vec<_>>().join("."), str::to_string),
        )
    };

    TypeName {
        package: package.to_string(),
        root,
        module,
        member: title(member),
    }
}

/// The set of `using` directives a program needs.
///
/// The runtime namespace is always required but printed separately, first, so it is excluded from
/// [`ImportSet::sorted`].
#[derive(Debug, Clone)]
pub struct ImportSet {
    runtime: String,
    imports: BTreeSet<String>,
}

impl ImportSet {
    pub fn new(runtime_namespace: &str) -> Self {
        let mut imports = BTreeSet::new();
        imports.insert(runtime_namespace.to_string());
        Self {
            runtime: runtime_namespace.to_string(),
            imports,
        }
    }

    pub fn add(&mut self, import: impl Into<String>) {
        let import = import.into();
        if !import.is_empty() {
            self.imports.insert(import);
        }
    }

    pub fn contains(&self, import: &str) -> bool {
        self.imports.contains(import)
    }

    /// Every import except the runtime namespace, sorted and deduplicated.
    pub fn sorted(&self) -> Vec<&str> {
        self.imports
            .iter()
            .map(String::as_str)
            .filter(|i| *i != self.runtime)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_metadata() -> PackageNamespaces {
        PackageNamespaces::new()
    }

    #[test]
    fn test_index_module_is_root() {
        let (name, diag) = resolve_resource("pkg:index:Thing", &no_metadata(), None);
        assert!(diag.is_none());
        assert_eq!(name.qualified(), "Pkg.Thing");
        assert_eq!(name.member, "Thing");
    }

    #[test]
    fn test_trailing_member_segment_dropped() {
        let (name, _) = resolve_resource("aws:s3/bucket:Bucket", &no_metadata(), None);
        assert_eq!(name.qualified(), "Aws.S3.Bucket");
    }

    #[test]
    fn test_trailing_segment_dropped_before_index_check() {
        let (name, _) = resolve_function(
            "aws:index/getAvailabilityZones:getAvailabilityZones",
            &no_metadata(),
            None,
        );
        assert_eq!(name.qualified(), "Aws.GetAvailabilityZones");
    }

    #[test]
    fn test_nested_module_path() {
        let (name, _) = resolve_resource("aws:ec2transitgateway/route:Route", &no_metadata(), None);
        assert_eq!(name.qualified(), "Aws.Ec2transitgateway.Route");
        let (name, _) = resolve_resource("kubernetes:apps/v1:Deployment", &no_metadata(), None);
        assert_eq!(name.qualified(), "Kubernetes.Apps.V1.Deployment");
    }

    #[test]
    fn test_metadata_overrides_fallback() {
        let metadata = PackageNamespaces::new()
            .with("aws", "aws", "Aws")
            .with("aws", "ec2transitgateway", "Ec2TransitGateway");
        let (name, _) = resolve_resource("aws:ec2transitgateway/route:Route", &metadata, None);
        assert_eq!(name.qualified(), "Aws.Ec2TransitGateway.Route");
    }

    #[test]
    fn test_dotted_key_lookup() {
        let metadata = PackageNamespaces::new().with("kubernetes", "apps.v1", "Apps.V1");
        let (name, _) = resolve_resource("kubernetes:apps/v1:Deployment", &metadata, None);
        assert_eq!(name.module.as_deref(), Some("Apps.V1"));
    }

    #[test]
    fn test_provider_token() {
        let (name, _) = resolve_resource("pulumi:providers:aws", &no_metadata(), None);
        assert_eq!(name.qualified(), "Aws.Provider");
        assert_eq!(name.package, "aws");
    }

    #[test]
    fn test_malformed_token_reports_and_falls_back() {
        let span = SourceSpan::new("main.pp", (2, 1), (2, 9));
        let (name, diag) = resolve_resource("aws-bucket", &no_metadata(), Some(&span));
        assert_eq!(name.qualified(), "aws-bucket");
        assert!(name.package_using("Pulumi").is_none());
        let diag = diag.expect("malformed token should report");
        assert!(diag.is_error());
        assert_eq!(diag.span, Some(span));
    }

    #[test]
    fn test_too_many_segments_is_malformed() {
        assert!(decompose_token("a:b:c:d").is_none());
        assert!(decompose_token("a::c").is_some());
    }

    #[test]
    fn test_package_using() {
        let (name, _) = resolve_resource("aws:s3/bucket:Bucket", &no_metadata(), None);
        assert_eq!(name.package_using("Pulumi").as_deref(), Some("Aws = Pulumi.Aws"));
    }

    #[test]
    fn test_import_set_sorted_without_runtime() {
        let mut imports = ImportSet::new("Pulumi");
        imports.add("System.Linq");
        imports.add("Aws = Pulumi.Aws");
        imports.add("System.Collections.Generic");
        imports.add("System.Linq");
        imports.add("");
        assert!(imports.contains("Pulumi"));
        assert_eq!(
            imports.sorted(),
            vec!["Aws = Pulumi.Aws", "System.Collections.Generic", "System.Linq"]
        );
    }
}
