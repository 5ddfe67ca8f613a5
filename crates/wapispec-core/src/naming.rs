use heck::ToPascalCase;

/// Capitalize a WAPI name into a schema/tag identifier.
///
/// The namespace separator is folded into a word separator first, so
/// `record:a` becomes `RecordA` and `a:aaaa` becomes `AAaaa`. Each segment
/// is lower-cased before its first letter is raised, so inner capitals of an
/// already-capitalized segment do not survive.
pub fn capitalize(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    snake_name(name)
        .split('_')
        .map(|word| word.to_lowercase().to_pascal_case())
        .collect()
}

/// Replace the namespace separator with an underscore.
pub fn snake_name(name: &str) -> String {
    name.replace(':', "_")
}

/// Name of the schema generated for a nested struct field.
pub fn nested_schema_name(owner: &str, field_name: &str) -> String {
    capitalize(&format!("{owner}_{field_name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize_snake() {
        assert_eq!(capitalize("dns_record"), "DnsRecord");
    }

    #[test]
    fn test_capitalize_namespaced() {
        assert_eq!(capitalize("record:a"), "RecordA");
        assert_eq!(capitalize("a:aaaa"), "AAaaa");
        assert_eq!(capitalize("grid:cloudapi:vmaddress"), "GridCloudapiVmaddress");
    }

    #[test]
    fn test_capitalize_lowers_inner_capitals() {
        assert_eq!(capitalize("RecordHostIpv4addrs_options"), "Recordhostipv4addrsOptions");
        assert_eq!(capitalize("DTC:LBDN"), "DtcLbdn");
    }

    #[test]
    fn test_capitalize_empty() {
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_capitalize_keeps_digits() {
        assert_eq!(capitalize("ipv4address"), "Ipv4address");
        assert_eq!(capitalize("record:aaaa"), "RecordAaaa");
    }

    #[test]
    fn test_nested_schema_name() {
        assert_eq!(nested_schema_name("record:a", "aws_rte53_record_info"), "RecordAAwsRte53RecordInfo");
        assert_eq!(nested_schema_name("RecordAAliases", "value"), "RecordaaliasesValue");
        assert_eq!(
            nested_schema_name("RecordHostIpv4addrs", "options"),
            "Recordhostipv4addrsOptions"
        );
    }

    #[test]
    fn test_snake_name() {
        assert_eq!(snake_name("record:host_ipv4addr"), "record_host_ipv4addr");
    }
}
