//! Face-name binding for STEP text.
//!
//! Face entities carry their name as the first string argument. Names are
//! assigned positionally, in the order the entities appear in the file, which
//! is the order faces were enumerated when the file was written. Reading goes
//! through the STEP entity table, ordered by entity id.

use ruststep::parser::parse;
use truck_stepio::r#in::Table;

use crate::types::KernelError;

/// Entity keywords that represent a B-rep face.
pub const FACE_ENTITY_KEYWORDS: [&str; 2] = ["ADVANCED_FACE", "FACE_SURFACE"];

/// Locate `KEYWORD('` openings of face entities. Returns the byte range of
/// each quoted name (without quotes).
fn face_name_spans(step: &str) -> Vec<(usize, usize)> {
    let bytes = step.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let matched = FACE_ENTITY_KEYWORDS.iter().find(|kw| {
            bytes[i..].starts_with(kw.as_bytes())
                && (i == 0 || !is_ident(bytes[i - 1]))
                && bytes[i + kw.len()..]
                    .iter()
                    .find(|b| !b.is_ascii_whitespace())
                    == Some(&b'(')
        });
        let Some(kw) = matched else {
            i += 1;
            continue;
        };
        let mut j = i + kw.len();
        while j < bytes.len() && bytes[j] != b'(' {
            j += 1;
        }
        j += 1;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j < bytes.len() && bytes[j] == b'\'' {
            let start = j + 1;
            let mut k = start;
            // '' is an escaped quote inside a STEP string
            while k < bytes.len() {
                if bytes[k] == b'\'' {
                    if k + 1 < bytes.len() && bytes[k + 1] == b'\'' {
                        k += 2;
                        continue;
                    }
                    break;
                }
                k += 1;
            }
            spans.push((start, k));
            i = k;
        } else {
            i = j;
        }
    }
    spans
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn escape(name: &str) -> String {
    name.replace('\'', "''")
}

/// Replace the names of all face entities, in file order.
pub fn bind_face_names(step: &str, names: &[String]) -> Result<String, KernelError> {
    let spans = face_name_spans(step);
    if spans.len() != names.len() {
        return Err(KernelError::Other {
            message: format!(
                "STEP text has {} face entities but {} names were given",
                spans.len(),
                names.len()
            ),
        });
    }
    let mut out = String::with_capacity(step.len() + names.iter().map(|n| n.len()).sum::<usize>());
    let mut cursor = 0;
    for ((start, end), name) in spans.into_iter().zip(names) {
        out.push_str(&step[cursor..start]);
        out.push_str(&escape(name));
        cursor = end;
    }
    out.push_str(&step[cursor..]);
    Ok(out)
}

/// Labels of all face entities, ordered by entity id.
pub fn read_face_names(step: &str) -> Result<Vec<String>, KernelError> {
    let exchange = parse(step).map_err(|e| KernelError::Other {
        message: format!("failed to parse STEP text: {e}"),
    })?;
    let data = exchange.data.first().ok_or_else(|| KernelError::Other {
        message: "STEP text has no data section".to_owned(),
    })?;
    let table = Table::from_data_section(data);
    let mut faces: Vec<_> = table.face_surface.iter().collect();
    faces.sort_by_key(|(id, _)| **id);
    Ok(faces.into_iter().map(|(_, face)| face.label.clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('sample'), '2;1');
ENDSEC;
DATA;
#10 = ADVANCED_FACE('', (#11), #12, .T.);
#11 = FACE_OUTER_BOUND('', #13, .T.);
#20 = ADVANCED_FACE('', (#21), #22, .F.);
#21 = FACE_BOUND('', #23, .T.);
ENDSEC;
END-ISO-10303-21;
";

    #[test]
    fn test_bind_and_read_back() {
        let named = bind_face_names(SAMPLE, &["3".to_string(), "24".to_string()]).unwrap();
        assert_eq!(read_face_names(&named).unwrap(), vec!["3", "24"]);
        assert!(named.contains("FACE_OUTER_BOUND('', #13"));
        assert!(named.contains("FACE_BOUND('', #23"));
    }

    #[test]
    fn test_count_mismatch_is_an_error() {
        assert!(bind_face_names(SAMPLE, &["1".to_string()]).is_err());
    }

    #[test]
    fn test_quotes_are_escaped() {
        let named = bind_face_names(SAMPLE, &["a'b".to_string(), "c".to_string()]).unwrap();
        assert!(named.contains("ADVANCED_FACE('a''b'"));
        assert!(named.contains("#20 = ADVANCED_FACE('c'"));
    }

    #[test]
    fn test_reader_orders_by_entity_id() {
        let text = "ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('sample'), '2;1');
ENDSEC;
DATA;
#30 = ADVANCED_FACE('late', (#31), #32, .T.);
#5 = ADVANCED_FACE('early', (#6), #7, .T.);
ENDSEC;
END-ISO-10303-21;
";
        assert_eq!(read_face_names(text).unwrap(), vec!["early", "late"]);
    }

    #[test]
    fn test_reader_rejects_malformed_text() {
        assert!(read_face_names("DATA;\n#1 = ADVANCED_FACE('', (#2), #3, .T.);\nENDSEC;\n").is_err());
        let no_data = "ISO-10303-21;\nHEADER;\nFILE_DESCRIPTION(('x'), '2;1');\nENDSEC;\nEND-ISO-10303-21;\n";
        assert!(read_face_names(no_data).is_err());
    }
}
