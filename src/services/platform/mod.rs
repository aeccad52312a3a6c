// Membership platform collaborators

pub mod access;
pub mod client;
pub mod identity;

pub use access::{
    AccessChecker, AccessError, AccessLevel, PlatformAccessChecker, UserTokenClaims,
    UserTokenVerifier, USER_TOKEN_HEADER,
};
pub use client::{PlatformClient, PlatformError};
pub use identity::{
    default_company_member_id, IdentityError, IdentityResolver, MemberProfile, MembershipDetails,
    PlatformIdentityResolver,
};
