//! Data-driven field extraction from heterogeneous upstream JSON
//!
//! Upstream responses vary in shape between API versions and endpoints. Each
//! value of interest is described by an ordered list of named extractors
//! tried in priority order against the response document; the first present,
//! non-null value wins. The mapping is plain data and testable without any
//! network code.

use serde_json::Value;

use xbridge_types::Amount;

/// One candidate location for a value in a response document
#[derive(Debug, Clone, Copy)]
pub struct FieldExtractor {
	/// Name for logs and diagnostics
	pub name: &'static str,
	/// Key path from the document root
	pub path: &'static [&'static str],
}

/// Output-amount locations, across known quote response shapes
pub const AMOUNT_OUT_FIELDS: &[FieldExtractor] = &[
	FieldExtractor {
		name: "estimate.toAmount",
		path: &["estimate", "toAmount"],
	},
	FieldExtractor {
		name: "toAmount",
		path: &["toAmount"],
	},
	FieldExtractor {
		name: "amountOut",
		path: &["amountOut"],
	},
	FieldExtractor {
		name: "outAmount",
		path: &["outAmount"],
	},
];

/// USD fee total locations
pub const FEE_USD_FIELDS: &[FieldExtractor] = &[
	FieldExtractor {
		name: "feeUsd",
		path: &["feeUsd"],
	},
	FieldExtractor {
		name: "estimate.feeUsd",
		path: &["estimate", "feeUsd"],
	},
	FieldExtractor {
		name: "fees.totalUsd",
		path: &["fees", "totalUsd"],
	},
];

/// Aggregate volume locations
pub const VOLUME_USD_FIELDS: &[FieldExtractor] = &[
	FieldExtractor {
		name: "volumeUsd",
		path: &["volumeUsd"],
	},
	FieldExtractor {
		name: "data.volumeUsd",
		path: &["data", "volumeUsd"],
	},
	FieldExtractor {
		name: "totalVolume",
		path: &["totalVolume"],
	},
];

/// Asset-list locations
pub const ASSET_LIST_FIELDS: &[FieldExtractor] = &[
	FieldExtractor {
		name: "tokens",
		path: &["tokens"],
	},
	FieldExtractor {
		name: "assets",
		path: &["assets"],
	},
	FieldExtractor {
		name: "data",
		path: &["data"],
	},
];

/// Chain-identifier locations within one asset entry
pub const ASSET_CHAIN_FIELDS: &[FieldExtractor] = &[
	FieldExtractor {
		name: "chainId",
		path: &["chainId"],
	},
	FieldExtractor {
		name: "chain",
		path: &["chain"],
	},
];

/// First present, non-null value among the extractor candidates
pub fn first_match<'a>(
	doc: &'a Value,
	extractors: &[FieldExtractor],
) -> Option<(&'static str, &'a Value)> {
	for extractor in extractors {
		if let Some(value) = lookup(doc, extractor.path) {
			if !value.is_null() {
				return Some((extractor.name, value));
			}
		}
	}
	None
}

fn lookup<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Value> {
	path.iter().try_fold(doc, |node, key| node.get(key))
}

/// Extract a raw amount given as a decimal string or an integer number
pub fn extract_amount(doc: &Value, extractors: &[FieldExtractor]) -> Option<Amount> {
	match first_match(doc, extractors)?.1 {
		Value::String(s) => Amount::from_decimal_str(s).ok(),
		Value::Number(n) => n.as_u64().map(Amount::from),
		_ => None,
	}
}

/// Extract a float given as a number or a parseable string
pub fn extract_f64(doc: &Value, extractors: &[FieldExtractor]) -> Option<f64> {
	match first_match(doc, extractors)?.1 {
		Value::Number(n) => n.as_f64(),
		Value::String(s) => s.parse().ok(),
		_ => None,
	}
}

/// Extract a string, accepting numbers by rendering them
pub fn extract_string(doc: &Value, extractors: &[FieldExtractor]) -> Option<String> {
	match first_match(doc, extractors)?.1 {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}

/// Extract an array value
pub fn extract_array<'a>(doc: &'a Value, extractors: &[FieldExtractor]) -> Option<&'a Vec<Value>> {
	first_match(doc, extractors)?.1.as_array()
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_priority_order_wins() {
		let doc = json!({
			"estimate": {"toAmount": "2000000"},
			"toAmount": "1"
		});
		let (name, _) = first_match(&doc, AMOUNT_OUT_FIELDS).unwrap();
		assert_eq!(name, "estimate.toAmount");
		assert_eq!(
			extract_amount(&doc, AMOUNT_OUT_FIELDS),
			Some(Amount::from(2_000_000u64))
		);
	}

	#[test]
	fn test_falls_through_missing_and_null() {
		let doc = json!({
			"estimate": {"toAmount": null},
			"amountOut": "500"
		});
		let (name, _) = first_match(&doc, AMOUNT_OUT_FIELDS).unwrap();
		assert_eq!(name, "amountOut");
	}

	#[test]
	fn test_no_candidate_present() {
		let doc = json!({"unrelated": 1});
		assert!(first_match(&doc, AMOUNT_OUT_FIELDS).is_none());
		assert!(extract_amount(&doc, AMOUNT_OUT_FIELDS).is_none());
	}

	#[test]
	fn test_amount_accepts_numbers_and_strings() {
		assert_eq!(
			extract_amount(&json!({"toAmount": 42}), AMOUNT_OUT_FIELDS),
			Some(Amount::from(42u64))
		);
		assert_eq!(
			extract_amount(&json!({"toAmount": "42"}), AMOUNT_OUT_FIELDS),
			Some(Amount::from(42u64))
		);
		// Malformed strings are rejected, not misparsed
		assert_eq!(
			extract_amount(&json!({"toAmount": "4.2"}), AMOUNT_OUT_FIELDS),
			None
		);
	}

	#[test]
	fn test_f64_extraction() {
		assert_eq!(
			extract_f64(&json!({"volumeUsd": 1234.5}), VOLUME_USD_FIELDS),
			Some(1234.5)
		);
		assert_eq!(
			extract_f64(&json!({"data": {"volumeUsd": "99.5"}}), VOLUME_USD_FIELDS),
			Some(99.5)
		);
	}

	#[test]
	fn test_string_extraction_renders_numbers() {
		assert_eq!(
			extract_string(&json!({"chainId": "ethereum"}), ASSET_CHAIN_FIELDS),
			Some("ethereum".to_string())
		);
		assert_eq!(
			extract_string(&json!({"chainId": 137}), ASSET_CHAIN_FIELDS),
			Some("137".to_string())
		);
	}

	#[test]
	fn test_array_extraction() {
		let doc = json!({"tokens": [{"symbol": "ETH"}]});
		assert_eq!(extract_array(&doc, ASSET_LIST_FIELDS).unwrap().len(), 1);
	}
}
