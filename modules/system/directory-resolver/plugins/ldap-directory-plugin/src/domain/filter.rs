//! RFC 4515 rendering of typed search filters.

use directory_resolver_sdk::Filter;
use ldap3::ldap_escape;

/// Render a filter to its LDAP string form.
///
/// Values are escaped, so user input can never change the filter structure.
/// Attribute names are taken from configuration and written as-is.
#[must_use]
pub fn render_filter(filter: &Filter) -> String {
    let mut out = String::new();
    render_into(filter, &mut out);
    out
}

fn render_into(filter: &Filter, out: &mut String) {
    match filter {
        Filter::And(filters) => render_set('&', filters, out),
        Filter::Or(filters) => render_set('|', filters, out),
        Filter::Equals { attribute, value } => {
            out.push('(');
            out.push_str(attribute);
            out.push('=');
            out.push_str(&ldap_escape(value.as_str()));
            out.push(')');
        }
        Filter::Prefix { attribute, value } => {
            out.push('(');
            out.push_str(attribute);
            out.push('=');
            out.push_str(&ldap_escape(value.as_str()));
            out.push_str("*)");
        }
    }
}

fn render_set(op: char, filters: &[Filter], out: &mut String) {
    out.push('(');
    out.push(op);
    for filter in filters {
        render_into(filter, out);
    }
    out.push(')');
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn renders_user_search_filter() {
        let filter = Filter::And(vec![
            Filter::equals("objectClass", "person"),
            Filter::Or(vec![
                Filter::prefix("cn", "mike"),
                Filter::prefix("givenName", "mike"),
                Filter::prefix("sn", "mike"),
            ]),
        ]);

        assert_eq!(
            render_filter(&filter),
            "(&(objectClass=person)(|(cn=mike*)(givenName=mike*)(sn=mike*)))"
        );
    }

    #[test]
    fn renders_equality() {
        assert_eq!(
            render_filter(&Filter::equals("cn", "test.user")),
            "(cn=test.user)"
        );
    }

    #[test]
    fn escapes_special_characters_in_values() {
        assert_eq!(render_filter(&Filter::equals("cn", "a*b")), r"(cn=a\2ab)");
        assert_eq!(
            render_filter(&Filter::equals("cn", "(admin)")),
            r"(cn=\28admin\29)"
        );
        assert_eq!(
            render_filter(&Filter::equals("cn", r"dom\user")),
            r"(cn=dom\5cuser)"
        );
        assert_eq!(render_filter(&Filter::equals("cn", "nul\0")), r"(cn=nul\00)");
    }

    #[test]
    fn prefix_wildcard_is_not_escaped_but_value_is() {
        assert_eq!(render_filter(&Filter::prefix("sn", "*")), r"(sn=\2a*)");
        assert_eq!(
            render_filter(&Filter::prefix("sn", ")(cn=*")),
            r"(sn=\29\28cn=\2a*)"
        );
    }
}
