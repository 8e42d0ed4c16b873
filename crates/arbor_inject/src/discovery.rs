//! Member discovery: which members of an owner take part in a pass.

use crate::descriptor::MemberDescriptor;
use crate::registry::ComponentInfo;

/// The members of one owner type, split by whether they can be resolved.
#[derive(Debug)]
pub struct Discovery<'r> {
    /// Members the resolver will search for, in declaration order.
    pub members: Vec<&'r MemberDescriptor>,
    /// Members carrying injection metadata that cannot be written.
    pub rejected: Vec<&'r MemberDescriptor>,
    /// `true` if any declared member requests force-creation.
    pub force_eligible: bool,
}

/// Splits the members of `info` into resolvable and rejected sets.
pub fn discover(info: &ComponentInfo) -> Discovery<'_> {
    let (members, rejected): (Vec<_>, Vec<_>) = info
        .members()
        .iter()
        .partition(|member| member.is_settable());
    Discovery {
        members,
        rejected,
        force_eligible: info.is_force_eligible(),
    }
}
