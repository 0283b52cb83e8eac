//! Admin dashboard computations.
//!
//! Every function here is pure: it takes whole-collection snapshots and the
//! current instant and returns a serializable view. Month buckets are ordered
//! oldest first, with the current month in the last slot.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Gender, Order, OrderStatus, Product, Role, User};

/// Share of the catalog held by one category, in whole percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePercent {
    pub revenue: f64,
    pub product: f64,
    pub user: f64,
    pub order: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub revenue: f64,
    pub product: usize,
    pub user: usize,
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRatio {
    pub male: f64,
    pub female: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderChart {
    pub order: Vec<u32>,
    pub revenue: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "_id")]
    pub id: String,
    pub discount: f64,
    pub amount: f64,
    pub quantity: usize,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub user_ratio: UserRatio,
    pub category_data: Vec<CategoryShare>,
    pub change_percent: ChangePercent,
    pub count: Totals,
    pub chart: OrderChart,
    pub latest_transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderFulfillment {
    pub processing: usize,
    pub shipped: usize,
    pub delivered: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAvailability {
    pub in_stock: usize,
    pub out_of_stock: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueDistribution {
    pub net_income: f64,
    pub discount: f64,
    pub production_cost: f64,
    pub burnt: f64,
    pub marketing_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeDistribution {
    pub teen: usize,
    pub adult: usize,
    pub old: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerDistribution {
    pub admin: usize,
    pub customer: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieCharts {
    pub order_fulfillment: OrderFulfillment,
    pub product_categories: Vec<CategoryShare>,
    pub stock_availability: StockAvailability,
    pub revenue_distribution: RevenueDistribution,
    pub user_age_distribution: AgeDistribution,
    pub customer_distribution: CustomerDistribution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarCharts {
    pub users: Vec<u32>,
    pub products: Vec<u32>,
    pub orders: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineCharts {
    pub users: Vec<u32>,
    pub products: Vec<u32>,
    pub discount: Vec<f64>,
    pub revenue: Vec<f64>,
}

/// Marketing spend is booked as a flat share of gross income.
const MARKETING_SHARE: f64 = 0.30;

/// Month-over-month change in percent.
///
/// With nothing last month the change is reported as `this * 100`.
///
/// # Example
///
/// ```
/// use storefront_core::analytics::calculate_percentage;
///
/// assert_eq!(calculate_percentage(150.0, 100.0), 50.0);
/// assert_eq!(calculate_percentage(3.0, 0.0), 300.0);
/// ```
pub fn calculate_percentage(this_month: f64, last_month: f64) -> f64 {
    if last_month == 0.0 {
        return this_month * 100.0;
    }
    ((this_month - last_month) / last_month * 100.0).round()
}

/// Whole calendar months between `at` and `now`, `None` for future instants.
pub fn months_ago(now: DateTime<Utc>, at: DateTime<Utc>) -> Option<u32> {
    let now_index = now.year() * 12 + now.month0() as i32;
    let at_index = at.year() * 12 + at.month0() as i32;
    u32::try_from(now_index - at_index).ok()
}

/// Counts instants into `months` buckets ending with the current month.
pub fn count_by_month<I>(now: DateTime<Utc>, months: usize, instants: I) -> Vec<u32>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut buckets = vec![0u32; months];
    for at in instants {
        if let Some(slot) = bucket_slot(now, at, months) {
            buckets[slot] += 1;
        }
    }
    buckets
}

/// Sums values into `months` buckets ending with the current month.
pub fn sum_by_month<I>(now: DateTime<Utc>, months: usize, values: I) -> Vec<f64>
where
    I: IntoIterator<Item = (DateTime<Utc>, f64)>,
{
    let mut buckets = vec![0f64; months];
    for (at, value) in values {
        if let Some(slot) = bucket_slot(now, at, months) {
            buckets[slot] += value;
        }
    }
    buckets
}

fn bucket_slot(now: DateTime<Utc>, at: DateTime<Utc>, months: usize) -> Option<usize> {
    let ago = months_ago(now, at)? as usize;
    (ago < months).then(|| months - ago - 1)
}

/// Percent of products per category, categories in alphabetical order.
pub fn category_shares(products: &[Product]) -> Vec<CategoryShare> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for product in products {
        *counts.entry(product.category.as_str()).or_default() += 1;
    }

    let total = products.len();
    counts
        .into_iter()
        .map(|(category, count)| CategoryShare {
            category: category.to_string(),
            percent: ((count as f64 / total as f64) * 100.0).round() as u32,
        })
        .collect()
}

fn percent_of(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Builds the main dashboard summary.
pub fn dashboard_stats(
    products: &[Product],
    users: &[User],
    orders: &[Order],
    now: DateTime<Utc>,
) -> DashboardStats {
    let in_month = |at: DateTime<Utc>, ago: u32| months_ago(now, at) == Some(ago);

    let revenue_in = |ago: u32| -> f64 {
        orders
            .iter()
            .filter(|o| in_month(o.created_at, ago))
            .map(|o| o.total)
            .sum()
    };

    let change = |instants: Vec<DateTime<Utc>>| {
        let this_month = instants.iter().filter(|at| in_month(**at, 0)).count();
        let last_month = instants.iter().filter(|at| in_month(**at, 1)).count();
        calculate_percentage(this_month as f64, last_month as f64)
    };

    let change_percent = ChangePercent {
        revenue: calculate_percentage(revenue_in(0), revenue_in(1)),
        product: change(products.iter().map(|p| p.created_at).collect()),
        user: change(users.iter().map(|u| u.created_at).collect()),
        order: change(orders.iter().map(|o| o.created_at).collect()),
    };

    let male = users.iter().filter(|u| u.gender == Gender::Male).count();

    let mut recent: Vec<&Order> = orders.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    DashboardStats {
        user_ratio: UserRatio {
            male: percent_of(male, users.len()),
            female: percent_of(users.len() - male, users.len()),
        },
        category_data: category_shares(products),
        change_percent,
        count: Totals {
            revenue: orders.iter().map(|o| o.total).sum(),
            product: products.len(),
            user: users.len(),
            order: orders.len(),
        },
        chart: OrderChart {
            order: count_by_month(now, 6, orders.iter().map(|o| o.created_at)),
            revenue: sum_by_month(now, 6, orders.iter().map(|o| (o.created_at, o.total))),
        },
        latest_transactions: recent
            .into_iter()
            .take(4)
            .map(|o| Transaction {
                id: o.id.clone(),
                discount: o.discount,
                amount: o.total,
                quantity: o.order_items.len(),
                status: o.status,
            })
            .collect(),
    }
}

/// Builds the distribution charts.
pub fn pie_charts(
    products: &[Product],
    users: &[User],
    orders: &[Order],
    now: DateTime<Utc>,
) -> PieCharts {
    let with_status = |status| orders.iter().filter(|o| o.status == status).count();

    let gross_income: f64 = orders.iter().map(|o| o.total).sum();
    let discount: f64 = orders.iter().map(|o| o.discount).sum();
    let production_cost: f64 = orders.iter().map(|o| o.shipping_charges).sum();
    let burnt: f64 = orders.iter().map(|o| o.tax).sum();
    let marketing_cost = (gross_income * MARKETING_SHARE).round();

    let out_of_stock = products.iter().filter(|p| p.stock == 0).count();
    let today = now.date_naive();
    let ages: Vec<u32> = users.iter().map(|u| u.age_on(today)).collect();
    let admins = users.iter().filter(|u| u.role == Role::Admin).count();

    PieCharts {
        order_fulfillment: OrderFulfillment {
            processing: with_status(OrderStatus::Processing),
            shipped: with_status(OrderStatus::Shipped),
            delivered: with_status(OrderStatus::Delivered),
        },
        product_categories: category_shares(products),
        stock_availability: StockAvailability {
            in_stock: products.len() - out_of_stock,
            out_of_stock,
        },
        revenue_distribution: RevenueDistribution {
            net_income: gross_income - discount - production_cost - burnt - marketing_cost,
            discount,
            production_cost,
            burnt,
            marketing_cost,
        },
        user_age_distribution: AgeDistribution {
            teen: ages.iter().filter(|a| **a < 20).count(),
            adult: ages.iter().filter(|a| (20..40).contains(*a)).count(),
            old: ages.iter().filter(|a| **a >= 40).count(),
        },
        customer_distribution: CustomerDistribution {
            admin: admins,
            customer: users.len() - admins,
            total: users.len(),
        },
    }
}

/// Six months of users and products, twelve months of orders.
pub fn bar_charts(
    products: &[Product],
    users: &[User],
    orders: &[Order],
    now: DateTime<Utc>,
) -> BarCharts {
    BarCharts {
        users: count_by_month(now, 6, users.iter().map(|u| u.created_at)),
        products: count_by_month(now, 6, products.iter().map(|p| p.created_at)),
        orders: count_by_month(now, 12, orders.iter().map(|o| o.created_at)),
    }
}

/// Twelve months of growth, discount and revenue.
pub fn line_charts(
    products: &[Product],
    users: &[User],
    orders: &[Order],
    now: DateTime<Utc>,
) -> LineCharts {
    LineCharts {
        users: count_by_month(now, 12, users.iter().map(|u| u.created_at)),
        products: count_by_month(now, 12, products.iter().map(|p| p.created_at)),
        discount: sum_by_month(now, 12, orders.iter().map(|o| (o.created_at, o.discount))),
        revenue: sum_by_month(now, 12, orders.iter().map(|o| (o.created_at, o.total))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_months_ago_crosses_year_boundary() {
        let now = at(2024, 2, 10);
        assert_eq!(months_ago(now, at(2024, 2, 1)), Some(0));
        assert_eq!(months_ago(now, at(2023, 12, 31)), Some(2));
        assert_eq!(months_ago(now, at(2024, 3, 1)), None);
    }

    #[test]
    fn test_count_by_month_orders_oldest_first() {
        let now = at(2024, 6, 15);
        let buckets = count_by_month(
            now,
            6,
            vec![at(2024, 6, 1), at(2024, 6, 2), at(2024, 1, 5), at(2023, 12, 1)],
        );
        assert_eq!(buckets, vec![1, 0, 0, 0, 0, 2]);
    }

    #[test]
    fn test_sum_by_month_ignores_future() {
        let now = at(2024, 6, 15);
        let buckets = sum_by_month(now, 2, vec![(at(2024, 5, 1), 10.0), (at(2024, 7, 1), 99.0)]);
        assert_eq!(buckets, vec![10.0, 0.0]);
    }

    #[test]
    fn test_percentage_rounds() {
        assert_eq!(calculate_percentage(2.0, 3.0), -33.0);
        assert_eq!(calculate_percentage(0.0, 0.0), 0.0);
    }
}
