use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::extractor::ListingTable;

/// How many addresses the summary ranks.
pub const TOP_ADDRESSES: usize = 5;

/// A price range in CFA. The first band includes its lower edge, the others
/// only their upper one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBand {
    pub label: &'static str,
    pub low: u64,
    pub high: u64,
}

pub const PRICE_BANDS: [PriceBand; 5] = [
    PriceBand { label: "0–5k", low: 0, high: 5_000 },
    PriceBand { label: "5–10k", low: 5_000, high: 10_000 },
    PriceBand { label: "10–20k", low: 10_000, high: 20_000 },
    PriceBand { label: "20–50k", low: 20_000, high: 50_000 },
    PriceBand { label: "50–100k", low: 50_000, high: 1_000_000_000 },
];

impl PriceBand {
    /// Band holding `price`; prices above the last edge fall in none.
    pub fn of(price: u64) -> Option<&'static PriceBand> {
        PRICE_BANDS.iter().find(|band| price <= band.high)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BandCount {
    pub band: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressCount {
    pub address: String,
    pub count: usize,
}

/// Headline figures for a cleaned table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub listings: usize,
    pub prices_present: usize,
    /// Truncated mean of the known prices, 0 when there are none.
    pub mean_price: u64,
    pub addresses_present: usize,
    /// One entry per band in band order, empty when no price is known.
    pub price_bands: Vec<BandCount>,
    /// Most frequent addresses, ties in order of first appearance.
    pub top_addresses: Vec<AddressCount>,
}

pub fn summarize(table: &ListingTable) -> Summary {
    let prices: Vec<u64> = table.records().iter().filter_map(|r| r.price).collect();
    let mean_price = match prices.len() {
        0 => 0,
        n => (prices.iter().map(|&p| u128::from(p)).sum::<u128>() / n as u128) as u64,
    };

    let price_bands = if prices.is_empty() {
        Vec::new()
    } else {
        let mut counts = [0usize; PRICE_BANDS.len()];
        for &price in &prices {
            if let Some(i) = PRICE_BANDS.iter().position(|band| price <= band.high) {
                counts[i] += 1;
            }
        }
        PRICE_BANDS
            .iter()
            .zip(counts)
            .map(|(band, count)| BandCount {
                band: band.label,
                count,
            })
            .collect()
    };

    let addresses: Vec<&str> = table
        .records()
        .iter()
        .filter_map(|r| r.address.as_deref())
        .collect();

    Summary {
        listings: table.len(),
        prices_present: prices.len(),
        mean_price,
        addresses_present: addresses.len(),
        price_bands,
        top_addresses: top_addresses(&addresses, TOP_ADDRESSES),
    }
}

fn top_addresses(addresses: &[&str], limit: usize) -> Vec<AddressCount> {
    // address -> (count, first position)
    let mut tally: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, &address) in addresses.iter().enumerate() {
        tally.entry(address).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<_> = tally.into_iter().collect();
    ranked.sort_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
        count_b.cmp(count_a).then(first_a.cmp(first_b))
    });
    ranked
        .into_iter()
        .take(limit)
        .map(|(address, (count, _))| AddressCount {
            address: address.to_string(),
            count,
        })
        .collect()
}

impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "listings           {}", self.listings)?;
        writeln!(f, "prices present     {}", self.prices_present)?;
        writeln!(f, "mean price (CFA)   {}", self.mean_price)?;
        writeln!(f, "addresses present  {}", self.addresses_present)?;

        if !self.price_bands.is_empty() {
            writeln!(f, "\nprice bands")?;
            for band in &self.price_bands {
                writeln!(f, "  {:<10} {}", band.band, band.count)?;
            }
        }
        if !self.top_addresses.is_empty() {
            writeln!(f, "\ntop addresses")?;
            for entry in &self.top_addresses {
                writeln!(f, "  {:<30} {}", entry.address, entry.count)?;
            }
        }
        Ok(())
    }
}
