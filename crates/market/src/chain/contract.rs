//! Contract bindings generated from the marketplace ABI.
//!
//! The ABI is carried in-repo (`abi/data_market.json`) and describes the
//! deployed marketplace contract: a 1-based `listings` array, per-buyer
//! purchase records, and escrow release via `confirmDelivery`.

use ethers::contract::abigen;

abigen!(DataMarket, "abi/data_market.json");
