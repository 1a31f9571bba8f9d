//! Fixture listings for local development.

use crate::{Money, NewProperty, Property, Result, store::ListingStore};

struct SeedListing {
    listing_url: &'static str,
    address: &'static str,
    city: &'static str,
    state: &'static str,
    zip: &'static str,
    price_dollars: i64,
    beds: i32,
    baths: f64,
    sqft: i32,
    description: &'static str,
    photos: u32,
}

const LISTINGS: [SeedListing; 8] = [
    SeedListing {
        listing_url: "https://example.com/listing/1001",
        address: "123 Main St",
        city: "Staten Island",
        state: "NY",
        zip: "10301",
        price_dollars: 525_000,
        beds: 3,
        baths: 2.0,
        sqft: 1450,
        description: "Solid brick home near ferry. Needs light rehab.",
        photos: 3,
    },
    SeedListing {
        listing_url: "https://example.com/listing/1002",
        address: "45 Bay St",
        city: "Staten Island",
        state: "NY",
        zip: "10301",
        price_dollars: 610_000,
        beds: 4,
        baths: 2.5,
        sqft: 1800,
        description: "Large single-family with basement unit.",
        photos: 4,
    },
    SeedListing {
        listing_url: "https://example.com/listing/1003",
        address: "789 Forest Ave",
        city: "Staten Island",
        state: "NY",
        zip: "10310",
        price_dollars: 475_000,
        beds: 2,
        baths: 1.0,
        sqft: 1100,
        description: "Fixer-upper with strong rental upside.",
        photos: 2,
    },
    SeedListing {
        listing_url: "https://example.com/listing/2001",
        address: "12 Maple St",
        city: "Newark",
        state: "NJ",
        zip: "07102",
        price_dollars: 390_000,
        beds: 3,
        baths: 1.5,
        sqft: 1350,
        description: "Cash-flow oriented BRRR candidate.",
        photos: 3,
    },
    SeedListing {
        listing_url: "https://example.com/listing/2002",
        address: "88 Market St",
        city: "Newark",
        state: "NJ",
        zip: "07105",
        price_dollars: 425_000,
        beds: 4,
        baths: 2.0,
        sqft: 1600,
        description: "Two-unit property with separate entrances.",
        photos: 4,
    },
    SeedListing {
        listing_url: "https://example.com/listing/3001",
        address: "301 Oak Dr",
        city: "Scranton",
        state: "PA",
        zip: "18503",
        price_dollars: 265_000,
        beds: 3,
        baths: 1.0,
        sqft: 1200,
        description: "Low purchase price, strong rent ratios.",
        photos: 2,
    },
    SeedListing {
        listing_url: "https://example.com/listing/3002",
        address: "77 Pine St",
        city: "Scranton",
        state: "PA",
        zip: "18504",
        price_dollars: 295_000,
        beds: 4,
        baths: 2.0,
        sqft: 1550,
        description: "Value-add opportunity near downtown.",
        photos: 3,
    },
    SeedListing {
        listing_url: "https://example.com/listing/4001",
        address: "9 Cedar Ln",
        city: "Buffalo",
        state: "NY",
        zip: "14201",
        price_dollars: 215_000,
        beds: 3,
        baths: 1.0,
        sqft: 1150,
        description: "Classic BRRR market with strong rents.",
        photos: 2,
    },
];

/// Placeholder photo URL for the `index`-th photo (1-based) of a property.
pub fn photo_url(property_id: i64, index: u32) -> String {
    format!("https://picsum.photos/seed/brrrr-{property_id}-{index}/800/600")
}

/// Inserts the fixture listings and their placeholder photos.
///
/// Listings whose URL is already stored are left alone, so seeding twice
/// is harmless.
#[tracing::instrument(skip(store))]
pub async fn seed<S: ListingStore + ?Sized>(store: &S) -> Result<Vec<Property>> {
    let mut inserted = Vec::new();

    for listing in &LISTINGS {
        if store.property_exists(listing.listing_url).await? {
            tracing::debug!(listing_url = listing.listing_url, "already seeded");
            continue;
        }

        let property = store
            .insert_property(
                NewProperty::new(
                    "manual",
                    listing.listing_url,
                    listing.address,
                    listing.city,
                    listing.state,
                    listing.zip,
                )
                .price(Money::from_dollars(listing.price_dollars))
                .beds(listing.beds)
                .baths(listing.baths)
                .sqft(listing.sqft)
                .description(listing.description),
            )
            .await?;

        for index in 1..=listing.photos {
            let sort_order = i32::try_from(index).unwrap_or(i32::MAX);
            store
                .add_photo(property.id, &photo_url(property.id.as_i64(), index), sort_order)
                .await?;
        }

        tracing::info!(property_id = %property.id, "inserted property");
        if let Some(full) = store.get_property(property.id).await? {
            inserted.push(full);
        }
    }

    Ok(inserted)
}
