//! CSV order and distance sources.
//!
//! Distance file: the first line holds the zone count, each following line
//! is one row of the matrix.
//!
//! Order file: one order per line,
//! `id,timestamp,zone,weight,customer_id,subscriber,fragile,hazardous,perishable`
//! with `TRUE`/`FALSE` flags. Neither file has a header.

use anyhow::{anyhow, bail, Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use dispatch_core::{Order, ZoneDistanceTable};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

const ORDER_FIELDS: usize = 9;

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input)
}

fn writer<W: Write>(output: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(output)
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.is_empty())
}

pub fn load_distance_table(path: &Path) -> Result<ZoneDistanceTable> {
    tracing::info!("Loading distance info from {}", path.display());
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_distance_table(file).with_context(|| format!("reading {}", path.display()))
}

pub fn read_distance_table<R: Read>(input: R) -> Result<ZoneDistanceTable> {
    let mut records = reader(input).into_records();

    let header = records
        .next()
        .ok_or_else(|| anyhow!("distance file is empty"))??;
    let zone_count: usize = header
        .get(0)
        .unwrap_or_default()
        .parse()
        .context("first line must be the zone count")?;

    let mut rows = Vec::with_capacity(zone_count);
    for (line, record) in records.enumerate() {
        let record = record?;
        if is_blank(&record) {
            continue;
        }
        let row = record
            .iter()
            .map(|field| field.parse::<f64>())
            .collect::<std::result::Result<Vec<f64>, _>>()
            .with_context(|| format!("distance row {} is not numeric", line))?;
        rows.push(row);
    }

    Ok(ZoneDistanceTable::new(zone_count, rows)?)
}

pub fn load_orders(path: &Path) -> Result<Vec<Order>> {
    tracing::info!("Loading order info from {}", path.display());
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_orders(file).with_context(|| format!("reading {}", path.display()))
}

pub fn read_orders<R: Read>(input: R) -> Result<Vec<Order>> {
    let mut orders = Vec::new();
    for (line, record) in reader(input).into_records().enumerate() {
        let record = record?;
        if is_blank(&record) {
            continue;
        }
        let order = parse_order(&record).with_context(|| format!("order line {}", line + 1))?;
        orders.push(order);
    }
    Ok(orders)
}

fn parse_order(record: &StringRecord) -> Result<Order> {
    if record.len() != ORDER_FIELDS {
        bail!("expected {} fields, found {}", ORDER_FIELDS, record.len());
    }
    let field = |index: usize| record.get(index).unwrap_or_default();

    Ok(Order {
        id: field(0).parse().context("id")?,
        timestamp: field(1).parse().context("timestamp")?,
        zone: field(2).parse().context("zone")?,
        weight: field(3).parse().context("weight")?,
        customer_id: field(4).parse().context("customer id")?,
        is_subscriber: parse_flag(field(5)).context("subscriber")?,
        is_fragile: parse_flag(field(6)).context("fragile")?,
        is_hazardous: parse_flag(field(7)).context("hazardous")?,
        is_perishable: parse_flag(field(8)).context("perishable")?,
    })
}

fn parse_flag(value: &str) -> Result<bool> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        bail!("expected TRUE or FALSE, found {:?}", value)
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

pub fn write_distance_table<W: Write>(output: W, table: &ZoneDistanceTable) -> Result<()> {
    let mut out = writer(output);
    out.write_record([table.zone_count().to_string()])?;
    for row in table.rows() {
        out.write_record(row.iter().map(|distance| distance.to_string()))?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_orders<W: Write>(output: W, orders: &[Order]) -> Result<()> {
    let mut out = writer(output);
    for order in orders {
        out.write_record([
            order.id.to_string(),
            order.timestamp.to_string(),
            order.zone.to_string(),
            order.weight.to_string(),
            order.customer_id.to_string(),
            flag(order.is_subscriber).to_string(),
            flag(order.is_fragile).to_string(),
            flag(order.is_hazardous).to_string(),
            flag(order.is_perishable).to_string(),
        ])?;
    }
    out.flush()?;
    Ok(())
}
