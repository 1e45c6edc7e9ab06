//! Verification oracles: pure functions returning pass/fail verdicts.
//!
//! Each oracle returns an `OracleVerdict` with diagnostic detail, not panics,
//! so one pass can collect every failure of a sample.

use brep_kernel::{KernelIntrospect, SolidHandle};
use feature_synth::disjoint::{distance, Footprint};
use feature_synth::{FastenerRegistry, Synthesized};
use synth_types::STOCK_LABEL;

/// The result of a single oracle check.
#[derive(Debug, Clone)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
}

impl OracleVerdict {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
        }
    }
}

// ── Label Oracles ───────────────────────────────────────────────────────────

/// One semantic label per face.
pub fn check_label_cardinality(labels: &[u32], face_count: usize) -> OracleVerdict {
    if labels.len() == face_count {
        OracleVerdict::pass("label_cardinality", format!("{face_count} faces labeled"))
    } else {
        OracleVerdict::fail(
            "label_cardinality",
            format!("{} labels for {} faces", labels.len(), face_count),
        )
    }
}

/// `m[i][j] == m[j][i]` for all pairs, and the matrix is square.
pub fn check_relation_symmetric(m: &[Vec<u8>]) -> OracleVerdict {
    let n = m.len();
    if let Some(i) = m.iter().position(|row| row.len() != n) {
        return OracleVerdict::fail(
            "relation_symmetric",
            format!("row {i} has {} entries, expected {n}", m[i].len()),
        );
    }
    for i in 0..n {
        for j in i + 1..n {
            if m[i][j] != m[j][i] {
                return OracleVerdict::fail(
                    "relation_symmetric",
                    format!("m[{i}][{j}] = {} but m[{j}][{i}] = {}", m[i][j], m[j][i]),
                );
            }
        }
    }
    OracleVerdict::pass("relation_symmetric", format!("{n}x{n} symmetric"))
}

/// Related faces have identical rows, so every group is a clique.
pub fn check_groups_are_cliques(m: &[Vec<u8>]) -> OracleVerdict {
    for (i, row) in m.iter().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            if v == 1 && i != j && m.get(j) != Some(row) {
                return OracleVerdict::fail(
                    "groups_are_cliques",
                    format!("faces {i} and {j} are related but their groups differ"),
                );
            }
        }
    }
    OracleVerdict::pass("groups_are_cliques", "all groups are cliques".to_string())
}

/// Every bottom face belongs to a group.
pub fn check_bottoms_in_groups(bottom: &[bool], m: &[Vec<u8>]) -> OracleVerdict {
    for (i, &b) in bottom.iter().enumerate() {
        let grouped = m.get(i).is_some_and(|row| row.iter().any(|&v| v == 1));
        if b && !grouped {
            return OracleVerdict::fail(
                "bottoms_in_groups",
                format!("bottom face {i} belongs to no instance"),
            );
        }
    }
    let count = bottom.iter().filter(|&&b| b).count();
    OracleVerdict::pass("bottoms_in_groups", format!("{count} bottom faces grouped"))
}

/// Faces outside every group carry the stock label.
pub fn check_ungrouped_faces_are_stock(labels: &[u32], m: &[Vec<u8>]) -> OracleVerdict {
    for (i, &label) in labels.iter().enumerate() {
        let grouped = m.get(i).is_some_and(|row| row.iter().any(|&v| v == 1));
        if !grouped && label != STOCK_LABEL {
            return OracleVerdict::fail(
                "ungrouped_faces_are_stock",
                format!("face {i} has label {label} but no instance"),
            );
        }
    }
    OracleVerdict::pass("ungrouped_faces_are_stock", "ok".to_string())
}

// ── Kernel and Export Oracles ───────────────────────────────────────────────

/// The kernel reports as many faces as there are labels.
pub fn check_kernel_face_count(
    introspect: &dyn KernelIntrospect,
    solid: &SolidHandle,
    labels: &[u32],
) -> OracleVerdict {
    match introspect.face_count(solid) {
        Ok(n) => check_label_cardinality(labels, n),
        Err(e) => OracleVerdict::fail("label_cardinality", format!("kernel error: {e}")),
    }
}

/// STEP face names and the label array agree index by index.
pub fn check_export_alignment(step_labels: &[u32], json_labels: &[u32]) -> OracleVerdict {
    if step_labels.len() != json_labels.len() {
        return OracleVerdict::fail(
            "export_alignment",
            format!("{} STEP faces, {} labels", step_labels.len(), json_labels.len()),
        );
    }
    match step_labels.iter().zip(json_labels).position(|(a, b)| a != b) {
        Some(i) => OracleVerdict::fail(
            "export_alignment",
            format!("face {i}: STEP {} vs JSON {}", step_labels[i], json_labels[i]),
        ),
        None => OracleVerdict::pass("export_alignment", format!("{} faces aligned", step_labels.len())),
    }
}

/// Every pair of selected companions is spatially independent.
pub fn check_companions_disjoint(registry: &FastenerRegistry, selected: &[usize]) -> OracleVerdict {
    for (n, &a) in selected.iter().enumerate() {
        for &b in &selected[n + 1..] {
            let (Some(ra), Some(rb)) = (registry.get(a), registry.get(b)) else {
                return OracleVerdict::fail(
                    "companions_disjoint",
                    format!("selection ({a}, {b}) outside the registry"),
                );
            };
            let d = distance(&Footprint::from(ra), &Footprint::from(rb));
            if d <= 0.0 {
                return OracleVerdict::fail(
                    "companions_disjoint",
                    format!("companions {a} and {b} overlap by {:.3}", -d),
                );
            }
        }
    }
    OracleVerdict::pass(
        "companions_disjoint",
        format!("{} companions independent", selected.len()),
    )
}

/// Every label oracle against one sample.
pub fn label_oracles(sample: &Synthesized) -> Vec<OracleVerdict> {
    let labels = sample.labels.semantic_labels();
    let m = sample.labels.relation_matrix();
    vec![
        check_label_cardinality(&labels, sample.faces.len()),
        check_relation_symmetric(&m),
        check_groups_are_cliques(&m),
        check_bottoms_in_groups(&sample.labels.bottom_labels(), &m),
        check_ungrouped_faces_are_stock(&labels, &m),
    ]
}
