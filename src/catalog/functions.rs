//! Function reference, grouped by category

use serde::Serialize;

use super::FieldEntry;

/// A category of AQL functions
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FunctionCategory {
    /// Display label
    pub label: &'static str,
    /// Short lookup key
    pub slug: &'static str,
    pub functions: &'static [FieldEntry],
}

const CALCULATION: &[FieldEntry] = &[
    FieldEntry::with_example("BASE64", "BASE64(value)", "Returns Base64 encoded string of binary data"),
    FieldEntry::with_example("CONCAT", "CONCAT(str1, str2, ...)", "Concatenates multiple strings into one"),
    FieldEntry::with_example(
        "DATEFORMAT",
        "DATEFORMAT(timestamp, 'format')",
        "Formats timestamp to readable form. Format: yyyy-MM-dd HH:mm:ss",
    ),
    FieldEntry::with_example("DOUBLE", "DOUBLE(value)", "Converts value to double data type"),
    FieldEntry::with_example("LONG", "LONG(value)", "Converts value to long integer"),
    FieldEntry::with_example("LOWER", "LOWER(string)", "Returns lowercase version of string"),
    FieldEntry::with_example("UPPER", "UPPER(string)", "Returns uppercase version of string"),
    FieldEntry::with_example("NOW", "NOW()", "Returns current time in milliseconds since epoch"),
    FieldEntry::with_example(
        "PARSEDATETIME",
        "PARSEDATETIME('time reference')",
        "Parses time reference (e.g., '1 hour ago', 'now')",
    ),
    FieldEntry::with_example(
        "PARSETIMESTAMP",
        "PARSETIMESTAMP('datetime', 'format')",
        "Converts datetime string to UNIX epoch",
    ),
    FieldEntry::with_example(
        "REPLACEALL",
        "REPLACEALL(string, 'regex', 'replacement')",
        "Replace all regex matches",
    ),
    FieldEntry::with_example(
        "REPLACEFIRST",
        "REPLACEFIRST(string, 'regex', 'replacement')",
        "Replace first regex match",
    ),
    FieldEntry::with_example("STR", "STR(value)", "Converts any value to string"),
    FieldEntry::with_example("STRLEN", "STRLEN(string)", "Returns length of string"),
    FieldEntry::with_example(
        "STRPOS",
        "STRPOS(string, 'substring')",
        "Returns position of substring (0-indexed, -1 if not found)",
    ),
    FieldEntry::with_example("SUBSTRING", "SUBSTRING(string, start, length)", "Extracts substring from string"),
    FieldEntry::with_example("UTF8", "UTF8(payload)", "Converts byte array to UTF-8 string"),
];

const AGGREGATION: &[FieldEntry] = &[
    FieldEntry::with_example("COUNT", "COUNT(*) or COUNT(field)", "Returns count of rows"),
    FieldEntry::with_example("SUM", "SUM(field)", "Returns sum of numeric field"),
    FieldEntry::with_example("AVG", "AVG(field)", "Returns average of numeric field"),
    FieldEntry::with_example("MIN", "MIN(field)", "Returns minimum value"),
    FieldEntry::with_example("MAX", "MAX(field)", "Returns maximum value"),
    FieldEntry::with_example("FIRST", "FIRST(field)", "Returns first value in aggregate"),
    FieldEntry::with_example("LAST", "LAST(field)", "Returns last value in aggregate"),
    FieldEntry::with_example("UNIQUECOUNT", "UNIQUECOUNT(field)", "Returns count of unique values"),
    FieldEntry::with_example("STDEV", "STDEV(field)", "Returns sample standard deviation"),
    FieldEntry::with_example("STDEVP", "STDEVP(field)", "Returns population standard deviation"),
];

const RETRIEVAL: &[FieldEntry] = &[
    FieldEntry::with_example("ASSETHOSTNAME", "ASSETHOSTNAME(ip)", "Returns hostname for IP from asset database"),
    FieldEntry::with_example("ASSETPROPERTY", "ASSETPROPERTY('property', ip)", "Returns asset property value"),
    FieldEntry::with_example("ASSETUSER", "ASSETUSER(ip)", "Returns username associated with IP"),
    FieldEntry::with_example("NETWORKNAME", "NETWORKNAME(ip)", "Returns network name from hierarchy"),
    FieldEntry::with_example("FULLNETWORKNAME", "FULLNETWORKNAME(ip)", "Returns full network path from hierarchy"),
    FieldEntry::with_example("APPLICATIONNAME", "APPLICATIONNAME(applicationid)", "Returns application name"),
    FieldEntry::with_example("CATEGORYNAME", "CATEGORYNAME(category)", "Returns category name"),
    FieldEntry::with_example("DOMAINNAME", "DOMAINNAME(domainid)", "Returns domain name"),
    FieldEntry::with_example("HOSTNAME", "HOSTNAME(processorid)", "Returns processor hostname"),
    FieldEntry::with_example("LOGSOURCENAME", "LOGSOURCENAME(logsourceid)", "Returns log source name"),
    FieldEntry::with_example("LOGSOURCETYPENAME", "LOGSOURCETYPENAME(devicetype)", "Returns log source type name"),
    FieldEntry::with_example("PROCESSORNAME", "PROCESSORNAME(processorid)", "Returns processor name"),
    FieldEntry::with_example("PROTOCOLNAME", "PROTOCOLNAME(protocolid)", "Returns protocol name (TCP, UDP, etc.)"),
    FieldEntry::with_example("QIDNAME", "QIDNAME(qid)", "Returns event name for QID"),
    FieldEntry::with_example("QIDDESCRIPTION", "QIDDESCRIPTION(qid)", "Returns event description for QID"),
    FieldEntry::with_example("RULENAME", "RULENAME(ruleid)", "Returns rule name"),
];

const GEOGRAPHIC: &[FieldEntry] = &[
    FieldEntry::with_example("GEO::LOOKUP", "GEO::LOOKUP(ip, 'property')", "Returns MaxMind location data as JSON"),
    FieldEntry::with_example(
        "GEO::LOOKUP_TEXT",
        "GEO::LOOKUP_TEXT(ip, 'property')",
        "Returns location data as text. Properties: city_name, country_name, continent_name",
    ),
    FieldEntry::with_example("GEO::DISTANCE", "GEO::DISTANCE(ip1, ip2)", "Returns distance between IPs in kilometers"),
];

const REFERENCE: &[FieldEntry] = &[
    FieldEntry::with_example(
        "REFERENCESETCONTAINS",
        "REFERENCESETCONTAINS('SetName', value)",
        "Returns true if value is in reference set",
    ),
    FieldEntry::with_example("REFERENCEMAP", "REFERENCEMAP('MapName', key)", "Returns value from reference map"),
    FieldEntry::with_example(
        "REFERENCETABLE",
        "REFERENCETABLE('TableName', 'column', key)",
        "Returns column value from reference table",
    ),
];

const FILTER: &[FieldEntry] = &[
    FieldEntry::with_example(
        "INCIDR",
        "INCIDR('cidr', ip)",
        "Returns true if IP is in CIDR range. Example: INCIDR('192.168.0.0/16', sourceip)",
    ),
    FieldEntry::with_example("INOFFENSE", "INOFFENSE(offenseid)", "Returns true if event belongs to specified offense"),
    FieldEntry::with_example("OFFENSE_TIME", "OFFENSE_TIME(offenseid)", "Limits query to offense timeframe"),
];

const CATEGORIES: &[FunctionCategory] = &[
    FunctionCategory {
        label: "Calculation & Formatting",
        slug: "calculation",
        functions: CALCULATION,
    },
    FunctionCategory {
        label: "Aggregation",
        slug: "aggregation",
        functions: AGGREGATION,
    },
    FunctionCategory {
        label: "Data Retrieval",
        slug: "retrieval",
        functions: RETRIEVAL,
    },
    FunctionCategory {
        label: "Geographic",
        slug: "geographic",
        functions: GEOGRAPHIC,
    },
    FunctionCategory {
        label: "Reference Data",
        slug: "reference",
        functions: REFERENCE,
    },
    FunctionCategory {
        label: "Filter",
        slug: "filter",
        functions: FILTER,
    },
];

/// All function categories in display order
pub fn function_categories() -> &'static [FunctionCategory] {
    CATEGORIES
}

/// Functions of a category, looked up by label or slug (case-insensitive)
///
/// Unknown categories yield an empty slice.
pub fn list_functions(category: &str) -> &'static [FieldEntry] {
    let category = category.trim();
    CATEGORIES
        .iter()
        .find(|c| c.slug.eq_ignore_ascii_case(category) || c.label.eq_ignore_ascii_case(category))
        .map(|c| c.functions)
        .unwrap_or(&[])
}

/// Every function across all categories
pub fn all_functions() -> impl Iterator<Item = &'static FieldEntry> {
    CATEGORIES.iter().flat_map(|c| c.functions.iter())
}

pub fn is_known_function(name: &str) -> bool {
    all_functions().any(|f| f.name.eq_ignore_ascii_case(name))
}

/// Names of the aggregate functions
pub fn aggregate_functions() -> impl Iterator<Item = &'static str> {
    AGGREGATION.iter().map(|f| f.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_slug_and_label() {
        assert_eq!(list_functions("aggregation").len(), 10);
        assert_eq!(list_functions("Data Retrieval").len(), 16);
        assert_eq!(list_functions("GEOGRAPHIC").len(), 3);
    }

    #[test]
    fn test_unknown_category_is_empty() {
        assert!(list_functions("bogus").is_empty());
        assert!(list_functions("").is_empty());
    }

    #[test]
    fn test_is_known_function() {
        assert!(is_known_function("QIDNAME"));
        assert!(is_known_function("uniquecount"));
        assert!(is_known_function("geo::lookup_text"));
        assert!(!is_known_function("FOOBAR"));
    }

    #[test]
    fn test_aggregates() {
        let aggs: Vec<_> = aggregate_functions().collect();
        assert!(aggs.contains(&"COUNT"));
        assert!(aggs.contains(&"STDEVP"));
        assert!(!aggs.contains(&"QIDNAME"));
    }

    #[test]
    fn test_every_function_has_syntax() {
        assert_eq!(all_functions().count(), 52);
        assert!(all_functions().all(|f| f.example.is_some()));
    }
}
