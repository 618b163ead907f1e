//! Bech32 text form of addresses.
//!
//! The data part is the address type byte followed by the address body. A
//! multi address is too long for that, so it is rendered as its reference:
//! the multi address type byte followed by `H(encode(multi))`.

use anyhow::{Context, Result};
use bech32::{Bech32, Hrp};
use nova_codec::{
    address::{Address, MultiAddress, MULTI_ADDRESS_KIND},
    Api,
};

fn encode(hrp: &str, data: &[u8]) -> Result<String> {
    let hrp = Hrp::parse(hrp).with_context(|| format!("invalid human-readable part {hrp:?}"))?;
    Ok(bech32::encode::<Bech32>(hrp, data)?)
}

/// Bech32 string of the reference of `multi`.
pub fn multi_reference(hrp: &str, multi: &MultiAddress) -> Result<String> {
    let mut data = Vec::with_capacity(33);
    data.push(MULTI_ADDRESS_KIND);
    data.extend_from_slice(&multi.reference()?.0);
    encode(hrp, &data)
}

/// Bech32 string of `address` under `hrp`.
pub fn address(api: &Api, hrp: &str, address: &Address) -> Result<String> {
    match address {
        Address::Multi(multi) => multi_reference(hrp, multi),
        other => encode(hrp, &api.encode(other)?),
    }
}
