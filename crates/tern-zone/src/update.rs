//! RFC 2136 dynamic update processing.
//!
//! [`check_prerequisites`] and [`apply_updates`] are pure functions over a
//! record list, following the pseudocode of RFC 2136 sections 3.2.5 and
//! 3.4.2. [`DynamicUpdate`] runs both against a [`Zone`] inside a single
//! mutation so no other writer can slip in between them.
//!
//! Owner names are compared case-insensitively everywhere, including the
//! zone membership test, which is label-wise.

use tracing::{debug, info, instrument};

use tern_proto::{Class, Name, RData, RecordClass, RecordType, ResourceRecord, ResponseCode};

use crate::error::Result;
use crate::zone::Zone;

/// Returns the class of a zone's data: the class of its first record, or IN
/// for an empty zone.
pub fn zone_class(records: &[ResourceRecord]) -> Class {
    records
        .first()
        .map_or(Class::Known(RecordClass::IN), ResourceRecord::rclass)
}

fn name_in_use(records: &[ResourceRecord], name: &Name) -> bool {
    records.iter().any(|r| r.name() == name)
}

fn rrset_exists(records: &[ResourceRecord], rr: &ResourceRecord) -> bool {
    records.iter().any(|r| r.matches(rr.name(), rr.rtype()))
}

fn exact_match(existing: &ResourceRecord, rr: &ResourceRecord) -> bool {
    existing.matches(rr.name(), rr.rtype()) && existing.rdata() == rr.rdata()
}

/// Evaluates the prerequisite section against the zone's records.
///
/// Prerequisites are checked in order and the first failure decides the
/// result. Nothing is modified.
pub fn check_prerequisites(
    origin: &Name,
    records: &[ResourceRecord],
    prerequisites: &[ResourceRecord],
) -> ResponseCode {
    let class = zone_class(records);

    for rr in prerequisites {
        if rr.ttl() != 0 {
            return ResponseCode::FormErr;
        }
        if !rr.name().is_subdomain_of(origin) {
            return ResponseCode::NotZone;
        }

        if rr.rclass() == RecordClass::ANY {
            if rr.rdata().is_some() {
                return ResponseCode::FormErr;
            }
            if rr.is_type(RecordType::ANY) {
                if !name_in_use(records, rr.name()) {
                    return ResponseCode::NXDomain;
                }
            } else if !rrset_exists(records, rr) {
                return ResponseCode::NXRRSet;
            }
        } else if rr.rclass() == RecordClass::NONE {
            if rr.rdata().is_some() {
                return ResponseCode::FormErr;
            }
            if rr.is_type(RecordType::ANY) {
                if name_in_use(records, rr.name()) {
                    return ResponseCode::YXDomain;
                }
            } else if rrset_exists(records, rr) {
                return ResponseCode::YXRRSet;
            }
        } else if rr.rclass() == class {
            if !records.iter().any(|r| exact_match(r, rr)) {
                return ResponseCode::NXRRSet;
            }
        } else {
            return ResponseCode::FormErr;
        }
    }

    ResponseCode::NoError
}

/// Validates every update before any is applied.
fn prescan(origin: &Name, class: Class, updates: &[ResourceRecord]) -> ResponseCode {
    for rr in updates {
        if !rr.name().is_subdomain_of(origin) {
            return ResponseCode::NotZone;
        }

        let rtype = rr.rtype();
        if rr.rclass() == class {
            if rtype.is_query_type() {
                return ResponseCode::FormErr;
            }
        } else if rr.rclass() == RecordClass::ANY {
            let bad_type = rtype.is_query_type() && !rtype.is(RecordType::ANY);
            if rr.ttl() != 0 || rr.rdata().is_some() || bad_type {
                return ResponseCode::FormErr;
            }
        } else if rr.rclass() == RecordClass::NONE {
            if rr.ttl() != 0 || rtype.is_query_type() {
                return ResponseCode::FormErr;
            }
            if rtype.is(RecordType::NS) && rr.name() == origin {
                // Apex NS records are only changed by replacing them.
                return ResponseCode::Refused;
            }
        } else {
            return ResponseCode::FormErr;
        }
    }

    ResponseCode::NoError
}

fn retain_counting(
    records: &mut Vec<ResourceRecord>,
    keep: impl FnMut(&ResourceRecord) -> bool,
) -> usize {
    let before = records.len();
    records.retain(keep);
    before - records.len()
}

/// Applies one update, returning the number of records it changed.
fn apply_one(
    origin: &Name,
    class: Class,
    records: &mut Vec<ResourceRecord>,
    rr: &ResourceRecord,
) -> usize {
    let name = rr.name();
    let at_apex = name == origin;

    if rr.rclass() == class {
        let mut matched = 0;
        let mut changed = 0;
        for existing in records.iter_mut().filter(|r| r.matches(name, rr.rtype())) {
            matched += 1;
            if existing.rdata() != rr.rdata() || existing.ttl() != rr.ttl() {
                existing.set_rdata(rr.rdata().cloned());
                existing.set_ttl(rr.ttl());
                changed += 1;
            }
        }
        if matched == 0 {
            records.push(rr.clone());
            return 1;
        }
        return changed;
    }

    if rr.rclass() == RecordClass::ANY {
        if rr.is_type(RecordType::ANY) {
            if at_apex {
                return retain_counting(records, |r| {
                    r.name() != name || r.is_type(RecordType::SOA) || r.is_type(RecordType::NS)
                });
            }
            return retain_counting(records, |r| r.name() != name);
        }
        if at_apex && (rr.is_type(RecordType::SOA) || rr.is_type(RecordType::NS)) {
            debug!(name = %name, rtype = %rr.rtype(), "skipping delete of apex RRset");
            return 0;
        }
        return retain_counting(records, |r| !r.matches(name, rr.rtype()));
    }

    // Class NONE, already vetted by the pre-scan.
    if rr.is_type(RecordType::SOA) {
        debug!(name = %name, "skipping delete of SOA record");
        return 0;
    }
    retain_counting(records, |r| !exact_match(r, rr))
}

fn apply(
    origin: &Name,
    records: &mut Vec<ResourceRecord>,
    updates: &[ResourceRecord],
) -> (ResponseCode, usize) {
    let class = zone_class(records);

    let code = prescan(origin, class, updates);
    if code != ResponseCode::NoError {
        return (code, 0);
    }

    let changed = updates
        .iter()
        .map(|rr| apply_one(origin, class, records, rr))
        .sum();
    (ResponseCode::NoError, changed)
}

/// Applies the update section to a zone's records.
///
/// All updates are validated first; if any is rejected the records are
/// left exactly as they were and the rejecting code is returned.
///
/// - Records in the zone class replace the payload and TTL of every record
///   with the same owner and type, or are appended if there is none.
/// - Class ANY with type ANY deletes every record at the owner. At the apex
///   the SOA and NS records survive.
/// - Class ANY with another type deletes that RRset, except the apex SOA
///   and NS RRsets.
/// - Class NONE deletes records equal in owner, type and payload. SOA
///   records are never deleted this way, and apex NS deletion is refused.
pub fn apply_updates(
    origin: &Name,
    records: &mut Vec<ResourceRecord>,
    updates: &[ResourceRecord],
) -> ResponseCode {
    apply(origin, records, updates).0
}

/// Increments the serial of the apex SOA record, if there is one.
pub fn bump_serial(origin: &Name, records: &mut [ResourceRecord]) -> Option<u32> {
    let soa = records
        .iter_mut()
        .filter(|r| r.name() == origin)
        .find_map(|r| r.rdata_mut().and_then(RData::as_soa_mut))?;
    soa.increment_serial();
    Some(soa.serial())
}

/// Handler for RFC 2136 Dynamic DNS Updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicUpdate {
    /// Whether a successful change increments the apex SOA serial.
    bump_soa_serial: bool,
}

impl DynamicUpdate {
    /// Creates a new dynamic update handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the SOA serial after every update that changed records.
    pub fn bump_soa_serial(mut self, bump: bool) -> Self {
        self.bump_soa_serial = bump;
        self
    }

    /// Checks the prerequisites and applies the updates as one transaction.
    ///
    /// The zone is only written when the prerequisites hold and every
    /// update passes validation.
    #[instrument(skip_all, fields(zone = %zone.origin()))]
    pub async fn process(
        &self,
        zone: &dyn Zone,
        prerequisites: &[ResourceRecord],
        updates: &[ResourceRecord],
    ) -> Result<ResponseCode> {
        let origin = zone.origin().clone();
        let bump = self.bump_soa_serial;
        let mut outcome = (ResponseCode::NoError, 0usize);
        let mut serial = None;

        zone.update(Box::new(|records| {
            let code = check_prerequisites(&origin, records, prerequisites);
            if code != ResponseCode::NoError {
                outcome = (code, 0);
                return false;
            }

            outcome = apply(&origin, records, updates);
            if outcome.0 != ResponseCode::NoError || outcome.1 == 0 {
                return false;
            }

            if bump {
                serial = bump_serial(&origin, records);
            }
            true
        }))
        .await?;

        let (code, changed) = outcome;
        if code == ResponseCode::NoError {
            info!(
                prerequisites = prerequisites.len(),
                updates = updates.len(),
                changed,
                serial,
                "dynamic update applied"
            );
        } else {
            info!(rcode = %code, "dynamic update rejected");
        }
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::str::FromStr;
    use tern_proto::rdata::{MX, NS, SOA};

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    fn origin() -> Name {
        name("example.com")
    }

    fn meta(host: &str, rtype: RecordType, class: RecordClass) -> ResourceRecord {
        ResourceRecord::new(name(host), rtype, class, 0, None)
    }

    fn apex() -> Vec<ResourceRecord> {
        vec![
            ResourceRecord::soa(
                origin(),
                3600,
                SOA::new(
                    name("ns1.example.com"),
                    name("hostmaster.example.com"),
                    10,
                    7200,
                    900,
                    1_209_600,
                    300,
                ),
            ),
            ResourceRecord::with_rdata(origin(), 3600, RData::NS(NS::new(name("ns1.example.com")))),
        ]
    }

    fn www_a(last: u8) -> ResourceRecord {
        ResourceRecord::a(name("www.example.com"), 300, Ipv4Addr::new(1, 2, 3, last))
    }

    #[test]
    fn test_zone_class() {
        assert_eq!(zone_class(&[]), RecordClass::IN);
        let chaos = ResourceRecord::new(origin(), RecordType::TXT, RecordClass::CH, 0, None);
        assert_eq!(zone_class(&[chaos]), RecordClass::CH);
    }

    #[test]
    fn test_prerequisite_name_in_use() {
        let prereq = [meta("www.example.com", RecordType::ANY, RecordClass::ANY)];

        let mut records = apex();
        assert_eq!(
            check_prerequisites(&origin(), &records, &prereq),
            ResponseCode::NXDomain
        );

        records.push(www_a(4));
        assert_eq!(
            check_prerequisites(&origin(), &records, &prereq),
            ResponseCode::NoError
        );
    }

    #[test]
    fn test_prerequisite_rrset_exists() {
        let mut records = apex();
        records.push(www_a(4));

        let prereq = [meta("WWW.Example.COM", RecordType::A, RecordClass::ANY)];
        assert_eq!(
            check_prerequisites(&origin(), &records, &prereq),
            ResponseCode::NoError
        );

        let prereq = [meta("www.example.com", RecordType::MX, RecordClass::ANY)];
        assert_eq!(
            check_prerequisites(&origin(), &records, &prereq),
            ResponseCode::NXRRSet
        );
    }

    #[test]
    fn test_prerequisite_not_in_use() {
        let mut records = apex();
        records.push(www_a(4));

        let prereq = [meta("www.example.com", RecordType::ANY, RecordClass::NONE)];
        assert_eq!(
            check_prerequisites(&origin(), &records, &prereq),
            ResponseCode::YXDomain
        );

        let prereq = [meta("www.example.com", RecordType::A, RecordClass::NONE)];
        assert_eq!(
            check_prerequisites(&origin(), &records, &prereq),
            ResponseCode::YXRRSet
        );

        let prereq = [meta("mail.example.com", RecordType::ANY, RecordClass::NONE)];
        assert_eq!(
            check_prerequisites(&origin(), &records, &prereq),
            ResponseCode::NoError
        );
    }

    #[test]
    fn test_prerequisite_value_dependent() {
        let mut records = apex();
        records.push(www_a(4));

        let mut wanted = www_a(4);
        wanted.set_ttl(0);
        assert_eq!(
            check_prerequisites(&origin(), &records, &[wanted]),
            ResponseCode::NoError
        );

        let mut other = www_a(5);
        other.set_ttl(0);
        assert_eq!(
            check_prerequisites(&origin(), &records, &[other]),
            ResponseCode::NXRRSet
        );
    }

    #[test]
    fn test_prerequisite_format_errors() {
        let records = apex();

        // Non-zero TTL.
        assert_eq!(
            check_prerequisites(&origin(), &records, &[www_a(4)]),
            ResponseCode::FormErr
        );

        // Payload on a class ANY prerequisite.
        let with_data = ResourceRecord::new(
            name("www.example.com"),
            RecordType::A,
            RecordClass::ANY,
            0,
            www_a(4).rdata().cloned(),
        );
        assert_eq!(
            check_prerequisites(&origin(), &records, &[with_data]),
            ResponseCode::FormErr
        );

        // Foreign class.
        let chaos = meta("www.example.com", RecordType::A, RecordClass::CH);
        assert_eq!(
            check_prerequisites(&origin(), &records, &[chaos]),
            ResponseCode::FormErr
        );
    }

    #[test]
    fn test_prerequisite_first_failure_wins() {
        let records = apex();
        let prereqs = [
            meta("www.example.org", RecordType::ANY, RecordClass::ANY),
            meta("www.example.com", RecordType::ANY, RecordClass::ANY),
        ];
        assert_eq!(
            check_prerequisites(&origin(), &records, &prereqs),
            ResponseCode::NotZone
        );
    }

    #[test]
    fn test_add_overwrites_in_place() {
        let mut records = apex();
        records.push(ResourceRecord::a(
            name("www.example.com"),
            60,
            Ipv4Addr::new(9, 9, 9, 9),
        ));

        let code = apply_updates(&origin(), &mut records, &[www_a(4)]);
        assert_eq!(code, ResponseCode::NoError);
        assert_eq!(records.len(), 3);
        assert_eq!(records[2], www_a(4));
    }

    #[test]
    fn test_add_appends_new_rrset() {
        let mut records = apex();
        let code = apply_updates(&origin(), &mut records, &[www_a(4)]);

        assert_eq!(code, ResponseCode::NoError);
        assert_eq!(records.len(), 3);
        assert_eq!(records.last(), Some(&www_a(4)));
    }

    #[test]
    fn test_delete_name() {
        let mut records = apex();
        records.push(ResourceRecord::a(name("old.example.com"), 60, Ipv4Addr::LOCALHOST));
        records.push(ResourceRecord::txt(name("old.example.com"), 60, "bye"));
        records.push(ResourceRecord::with_rdata(
            name("old.example.com"),
            60,
            RData::MX(MX::new(10, name("mail.example.com"))),
        ));
        records.push(www_a(4));

        let update = meta("old.example.com", RecordType::ANY, RecordClass::ANY);
        assert_eq!(
            apply_updates(&origin(), &mut records, &[update]),
            ResponseCode::NoError
        );

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.name() != &name("old.example.com")));
        assert!(records.contains(&www_a(4)));
    }

    #[test]
    fn test_delete_name_at_apex_keeps_soa_and_ns() {
        let mut records = apex();
        records.push(ResourceRecord::txt(origin(), 60, "v=spf1 -all"));

        let update = meta("example.com", RecordType::ANY, RecordClass::ANY);
        assert_eq!(
            apply_updates(&origin(), &mut records, &[update]),
            ResponseCode::NoError
        );
        assert_eq!(records, apex());
    }

    #[test]
    fn test_delete_rrset() {
        let mut records = apex();
        records.push(www_a(4));
        records.push(www_a(5));
        records.push(ResourceRecord::txt(name("www.example.com"), 60, "keep"));

        let update = meta("www.example.com", RecordType::A, RecordClass::ANY);
        apply_updates(&origin(), &mut records, &[update]);

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| !r.is_type(RecordType::A)));
    }

    #[test]
    fn test_delete_rrset_protects_apex_only() {
        let delegation = ResourceRecord::with_rdata(
            name("sub.example.com"),
            3600,
            RData::NS(NS::new(name("ns.sub.example.com"))),
        );
        let mut records = apex();
        records.push(delegation);

        let updates = [
            meta("example.com", RecordType::NS, RecordClass::ANY),
            meta("example.com", RecordType::SOA, RecordClass::ANY),
            meta("sub.example.com", RecordType::NS, RecordClass::ANY),
        ];
        apply_updates(&origin(), &mut records, &updates);

        assert_eq!(records, apex());
    }

    #[test]
    fn test_delete_exact_record() {
        let mut records = apex();
        records.push(www_a(4));
        records.push(www_a(5));

        let target = ResourceRecord::new(
            name("www.example.com"),
            RecordType::A,
            RecordClass::NONE,
            0,
            www_a(4).rdata().cloned(),
        );
        apply_updates(&origin(), &mut records, &[target]);

        assert_eq!(records.len(), 3);
        assert!(records.contains(&www_a(5)));
        assert!(!records.contains(&www_a(4)));
    }

    #[test]
    fn test_delete_soa_is_ignored() {
        let mut records = apex();
        let soa = records[0].clone();
        let target = ResourceRecord::new(
            origin(),
            RecordType::SOA,
            RecordClass::NONE,
            0,
            soa.rdata().cloned(),
        );

        assert_eq!(
            apply_updates(&origin(), &mut records, &[target]),
            ResponseCode::NoError
        );
        assert_eq!(records, apex());
    }

    #[test]
    fn test_delete_apex_ns_refused() {
        let mut records = apex();
        let ns = records[1].clone();
        let target = ResourceRecord::new(
            origin(),
            RecordType::NS,
            RecordClass::NONE,
            0,
            ns.rdata().cloned(),
        );

        assert_eq!(
            apply_updates(&origin(), &mut records, &[target]),
            ResponseCode::Refused
        );
        assert_eq!(records, apex());
    }

    #[test]
    fn test_prescan_rejects_before_any_change() {
        let mut records = apex();
        let updates = [
            www_a(4),
            ResourceRecord::a(name("www.example.org"), 300, Ipv4Addr::LOCALHOST),
        ];

        assert_eq!(
            apply_updates(&origin(), &mut records, &updates),
            ResponseCode::NotZone
        );
        assert_eq!(records, apex());
    }

    #[test]
    fn test_prescan_format_errors() {
        let cases = [
            // Meta type in the zone class.
            meta("www.example.com", RecordType::ANY, RecordClass::IN),
            ResourceRecord::new(name("www.example.com"), RecordType::AXFR, RecordClass::IN, 300, None),
            // Class ANY with a TTL, a payload or a transfer type.
            ResourceRecord::new(name("www.example.com"), RecordType::A, RecordClass::ANY, 60, None),
            ResourceRecord::new(
                name("www.example.com"),
                RecordType::A,
                RecordClass::ANY,
                0,
                www_a(4).rdata().cloned(),
            ),
            meta("www.example.com", RecordType::MAILA, RecordClass::ANY),
            // Class NONE with a TTL or a meta type.
            ResourceRecord::new(name("www.example.com"), RecordType::A, RecordClass::NONE, 60, None),
            meta("www.example.com", RecordType::ANY, RecordClass::NONE),
            // Foreign class.
            meta("www.example.com", RecordType::A, RecordClass::HS),
        ];

        for update in cases {
            let mut records = apex();
            assert_eq!(
                apply_updates(&origin(), &mut records, std::slice::from_ref(&update)),
                ResponseCode::FormErr,
                "{update}"
            );
            assert_eq!(records, apex());
        }
    }

    #[test]
    fn test_bump_serial() {
        let mut records = apex();
        assert_eq!(bump_serial(&origin(), &mut records), Some(11));
        assert_eq!(bump_serial(&name("other.com"), &mut records), None);
    }
}
