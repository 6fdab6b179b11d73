//! Typed projections of remote response bodies
//!
//! Each remote call gets an explicit record here instead of ad hoc field
//! probing at call sites. Projection is as lenient as the decoder beneath it:
//! a malformed or empty body projects to an empty list, which callers treat
//! as "nothing there yet."

use crate::xml::{self, Element};

/// One security group as described by the remote authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroup {
    pub id: String,
    pub name: Option<String>,
    pub vpc_id: Option<String>,
    pub permissions: Vec<IpPermission>,
}

/// One ingress rule entry inside a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpPermission {
    pub protocol: String,
    pub from_port: Option<u16>,
    pub to_port: Option<u16>,
    pub cidrs: Vec<String>,
    pub peer_ids: Vec<String>,
}

/// One network as described by the remote authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vpc {
    pub id: String,
    pub is_default: bool,
}

/// Project a `DescribeSecurityGroups` response body into typed groups.
pub fn security_groups(body: &str) -> Vec<SecurityGroup> {
    let Some(root) = xml::parse(body) else {
        return Vec::new();
    };
    let Some(set) = root.descendant("securityGroupInfo") else {
        return Vec::new();
    };
    set.items().filter_map(group_from).collect()
}

/// Project a `DescribeVpcs` response body into typed networks.
pub fn vpcs(body: &str) -> Vec<Vpc> {
    let Some(root) = xml::parse(body) else {
        return Vec::new();
    };
    let Some(set) = root.descendant("vpcSet") else {
        return Vec::new();
    };
    set.items()
        .filter_map(|item| {
            Some(Vpc {
                id: item.child_text("vpcId")?.to_string(),
                is_default: item.child_text("isDefault") == Some("true"),
            })
        })
        .collect()
}

fn group_from(item: &Element) -> Option<SecurityGroup> {
    let id = item.child_text("groupId")?.to_string();
    let permissions = item
        .child("ipPermissions")
        .map(|set| set.items().map(permission_from).collect())
        .unwrap_or_default();
    Some(SecurityGroup {
        id,
        name: item.child_text("groupName").map(str::to_string),
        vpc_id: item.child_text("vpcId").map(str::to_string),
        permissions,
    })
}

fn permission_from(item: &Element) -> IpPermission {
    IpPermission {
        protocol: item.child_text("ipProtocol").unwrap_or("").to_string(),
        from_port: item.child_text("fromPort").and_then(|p| p.parse().ok()),
        to_port: item.child_text("toPort").and_then(|p| p.parse().ok()),
        cidrs: collection_texts(item, "ipRanges", "cidrIp"),
        peer_ids: collection_texts(item, "groups", "groupId"),
    }
}

/// Texts of `<leaf>` under each `<item>` of the `<set>` child.
fn collection_texts(item: &Element, set: &str, leaf: &str) -> Vec<String> {
    item.child(set)
        .map(|set| {
            set.items()
                .filter_map(|entry| entry.child_text(leaf).map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range_item(cidr: &str) -> String {
        format!("<item><cidrIp>{cidr}</cidrIp></item>")
    }

    fn permission_item(port: u16, ranges: &[&str]) -> String {
        let ranges: String = ranges.iter().map(|r| range_item(r)).collect();
        format!(
            "<item><ipProtocol>tcp</ipProtocol><fromPort>{port}</fromPort>\
             <toPort>{port}</toPort><ipRanges>{ranges}</ipRanges></item>"
        )
    }

    fn group_item(id: &str, permissions: &str) -> String {
        format!(
            "<item><groupId>{id}</groupId><groupName>{id}-name</groupName>\
             <vpcId>vpc-1</vpcId><ipPermissions>{permissions}</ipPermissions></item>"
        )
    }

    fn describe_body(groups: &str) -> String {
        format!(
            "<DescribeSecurityGroupsResponse><requestId>r</requestId>\
             <securityGroupInfo>{groups}</securityGroupInfo>\
             </DescribeSecurityGroupsResponse>"
        )
    }

    /// Three groups, two permissions each, two nested ranges each: the
    /// decoder must attribute every one of the 3x2x2 leaves to its own
    /// parent permission and group, never flattening or cross-attributing.
    #[test]
    fn nested_collections_keep_their_attribution() {
        let mut groups = String::new();
        for g in 0..3u16 {
            let permissions = format!(
                "{}{}",
                permission_item(1000 + g, &[&format!("10.{g}.1.0/24"), &format!("10.{g}.2.0/24")]),
                permission_item(2000 + g, &[&format!("10.{g}.3.0/24"), &format!("10.{g}.4.0/24")]),
            );
            groups.push_str(&group_item(&format!("sg-{g}"), &permissions));
        }
        let parsed = security_groups(&describe_body(&groups));

        assert_eq!(parsed.len(), 3);
        for (g, group) in parsed.iter().enumerate() {
            assert_eq!(group.id, format!("sg-{g}"));
            assert_eq!(group.permissions.len(), 2);
            for (p, permission) in group.permissions.iter().enumerate() {
                let expected_port = (1000 + 1000 * p + g) as u16;
                assert_eq!(permission.from_port, Some(expected_port));
                assert_eq!(
                    permission.cidrs,
                    vec![
                        format!("10.{}.{}.0/24", g, 2 * p + 1),
                        format!("10.{}.{}.0/24", g, 2 * p + 2),
                    ]
                );
            }
        }
    }

    #[test]
    fn peer_references_are_projected() {
        let permission = "<item><ipProtocol>tcp</ipProtocol>\
            <fromPort>5432</fromPort><toPort>5432</toPort>\
            <groups><item><groupId>sg-web</groupId><userId>1234</userId></item>\
            <item><groupId>sg-app</groupId></item></groups></item>";
        let body = describe_body(&group_item("sg-db", permission));
        let parsed = security_groups(&body);
        assert_eq!(parsed[0].permissions[0].peer_ids, vec!["sg-web", "sg-app"]);
        assert!(parsed[0].permissions[0].cidrs.is_empty());
    }

    #[test]
    fn empty_or_malformed_bodies_project_to_nothing() {
        assert!(security_groups("").is_empty());
        assert!(security_groups("<unrelated/>").is_empty());
        assert!(security_groups("<DescribeSecurityGroupsResponse/>").is_empty());
        assert!(vpcs("no xml here").is_empty());
    }

    #[test]
    fn group_without_permissions_projects_empty_list() {
        let body = describe_body("<item><groupId>sg-lonely</groupId></item>");
        let parsed = security_groups(&body);
        assert_eq!(parsed.len(), 1);
        assert!(parsed[0].permissions.is_empty());
        assert_eq!(parsed[0].name, None);
    }

    #[test]
    fn default_vpc_is_flagged() {
        let body = "<DescribeVpcsResponse><vpcSet>\
            <item><vpcId>vpc-a</vpcId><isDefault>false</isDefault></item>\
            <item><vpcId>vpc-b</vpcId><isDefault>true</isDefault></item>\
            </vpcSet></DescribeVpcsResponse>";
        let parsed = vpcs(body);
        assert_eq!(parsed.len(), 2);
        assert!(parsed[1].is_default);
        assert_eq!(parsed[1].id, "vpc-b");
    }
}
