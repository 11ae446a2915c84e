//! Explicit navigation of the variable-discovery namespace tree.
//!
//! The archive organizes variables under a hierarchy of named nodes. This
//! module exposes that tree as two explicit calls — list the children of a
//! node, list the variables attached to a node — instead of any lazy
//! attribute-style lookup. Node names are passed through [`sanitize`] so
//! they are usable as plain identifiers; the raw name stays available on
//! the node itself.

use std::collections::BTreeMap;

use snafu::prelude::*;

use crate::client::error::{QueryResult, ServiceSnafu};
use crate::service::{HierarchyNode, HierarchyService};

/// Characters replaced by `_` in sanitized names.
const REPLACED: &[char] = &[' ', '_', ';', '>', '<', '/', ':', '.'];

/// Turn a raw node or variable name into a plain identifier: a leading
/// digit gets a `_` prefix, and separator or punctuation characters become
/// `_`.
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 1);
    if name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.push('_');
    }
    for c in name.chars() {
        if REPLACED.contains(&c) {
            out.push('_');
        } else {
            out.push(c);
        }
    }
    out
}

/// Read-only browser over a [`HierarchyService`].
#[derive(Clone, Debug)]
pub struct HierarchyBrowser<H> {
    service: H,
}

impl<H: HierarchyService> HierarchyBrowser<H> {
    /// Wrap an injected hierarchy service handle.
    pub fn new(service: H) -> Self {
        HierarchyBrowser { service }
    }

    /// Children of `node`, keyed by sanitized name; `None` lists the top
    /// level of the tree.
    pub fn list_children(
        &self,
        node: Option<&HierarchyNode>,
    ) -> QueryResult<BTreeMap<String, HierarchyNode>> {
        let children = match node {
            None => self.service.top_level_nodes().context(ServiceSnafu)?,
            Some(node) => self.service.children_of(node).context(ServiceSnafu)?,
        };
        Ok(children.into_iter().map(|child| (sanitize(&child.name), child)).collect())
    }

    /// Names of the variables attached to `node`.
    pub fn list_variables(&self, node: &HierarchyNode) -> QueryResult<Vec<String>> {
        self.service.variables_attached_to(node).context(ServiceSnafu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{ServiceError, ServiceResult};

    #[test]
    fn sanitize_prefixes_leading_digit() {
        assert_eq!(sanitize("4L1"), "_4L1");
    }

    #[test]
    fn sanitize_replaces_punctuation() {
        assert_eq!(sanitize("LHC.BCTDC:BEAM A"), "LHC_BCTDC_BEAM_A");
    }

    #[test]
    fn sanitize_leaves_clean_names_alone() {
        assert_eq!(sanitize("BCTFR"), "BCTFR");
    }

    struct TwoLevelTree;

    impl HierarchyService for TwoLevelTree {
        fn top_level_nodes(&self) -> ServiceResult<Vec<HierarchyNode>> {
            Ok(vec![
                HierarchyNode { node_id: 1, name: "LHC".to_string(), description: None },
                HierarchyNode { node_id: 2, name: "4 SPS".to_string(), description: None },
            ])
        }

        fn children_of(&self, node: &HierarchyNode) -> ServiceResult<Vec<HierarchyNode>> {
            match node.node_id {
                1 => Ok(vec![HierarchyNode {
                    node_id: 3,
                    name: "Beam Instrumentation".to_string(),
                    description: Some("BI".to_string()),
                }]),
                _ => Ok(Vec::new()),
            }
        }

        fn variables_attached_to(&self, node: &HierarchyNode) -> ServiceResult<Vec<String>> {
            match node.node_id {
                3 => Ok(vec!["LHC.BCTDC.A".to_string(), "LHC.BCTDC.B".to_string()]),
                _ => Err(ServiceError::new("unknown node")),
            }
        }
    }

    #[test]
    fn list_children_sanitizes_keys() {
        let browser = HierarchyBrowser::new(TwoLevelTree);
        let top = browser.list_children(None).unwrap();
        assert!(top.contains_key("LHC"));
        assert!(top.contains_key("_4_SPS"));

        let below = browser.list_children(Some(&top["LHC"])).unwrap();
        assert!(below.contains_key("Beam_Instrumentation"));
        assert_eq!(
            browser.list_variables(&below["Beam_Instrumentation"]).unwrap().len(),
            2
        );
    }
}
