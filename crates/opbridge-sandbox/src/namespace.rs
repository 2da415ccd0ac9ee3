//! The script-visible capability namespace.
//!
//! One member per registered operation, keyed by the operation's script
//! name.  The namespace is derived from the registry and never edited
//! afterwards, so it can only ever expose what the registry holds.

use opbridge_registry::{OpDescriptor, OpName, OpRegistry, Synchronicity};

/// One member of the namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceEntry {
    pub member: &'static str,
    pub descriptor: OpDescriptor,
}

impl NamespaceEntry {
    pub fn op(&self) -> OpName {
        self.descriptor.name
    }

    pub fn synchronicity(&self) -> Synchronicity {
        self.descriptor.synchronicity
    }

    pub fn is_async(&self) -> bool {
        self.descriptor.synchronicity == Synchronicity::Async
    }
}

/// The fixed set of wrappers installed under one global name.
#[derive(Debug, Clone)]
pub struct CapabilityNamespace {
    name: String,
    entries: Vec<NamespaceEntry>,
}

impl CapabilityNamespace {
    pub fn from_registry(name: impl Into<String>, registry: &OpRegistry) -> Self {
        let entries = registry
            .descriptors()
            .map(|descriptor| NamespaceEntry {
                member: descriptor.name.script_name(),
                descriptor: *descriptor,
            })
            .collect();
        Self {
            name: name.into(),
            entries,
        }
    }

    /// Global the namespace is installed under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, member: &str) -> Option<&NamespaceEntry> {
        self.entries.iter().find(|e| e.member == member)
    }

    pub fn entries(&self) -> &[NamespaceEntry] {
        &self.entries
    }

    pub fn members(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.member)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use opbridge_registry::HostConfig;

    use super::*;

    #[test]
    fn one_member_per_registered_op() {
        let registry = OpRegistry::standard(&HostConfig::default()).unwrap();
        let ns = CapabilityNamespace::from_registry("runjs", &registry);

        assert_eq!(ns.name(), "runjs");
        assert_eq!(ns.len(), registry.len());
        let members: Vec<_> = ns.members().collect();
        assert_eq!(
            members,
            vec![
                "readFile",
                "writeFile",
                "removeFile",
                "fetch",
                "struct_to_struct",
                "struct_to_struct_01",
                "vec_to_vec",
                "true_to_false",
                "float_x_3",
                "integer_x_3",
            ]
        );
    }

    #[test]
    fn lookup_by_member_name() {
        let registry = OpRegistry::standard(&HostConfig::default()).unwrap();
        let ns = CapabilityNamespace::from_registry("runjs", &registry);

        let read = ns.get("readFile").unwrap();
        assert_eq!(read.op(), OpName::ReadFile);
        assert!(read.is_async());

        let remove = ns.get("removeFile").unwrap();
        assert_eq!(remove.synchronicity(), Synchronicity::Sync);

        assert!(ns.get("op_read_file").is_none());
        assert!(ns.get("spawn").is_none());
    }

    #[test]
    fn denied_capabilities_are_absent() {
        let cfg = HostConfig::new().with_allow_network(false);
        let registry = OpRegistry::standard(&cfg).unwrap();
        let ns = CapabilityNamespace::from_registry("runjs", &registry);
        assert!(ns.get("fetch").is_none());
        assert!(ns.get("readFile").is_some());
    }
}
