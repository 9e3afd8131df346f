//! Aggregate counts for the operational overview.
//!
//! Recomputed on every read and never written back to the store.

use fleet_core::{Drone, DroneStatus, Order, OrderStatus, Priority};

/// Overview indicators derived from one drones/orders snapshot
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FleetSummary {
    pub total_drones: usize,
    /// Loading, flying or delivering
    pub active_drones: usize,
    pub in_flight: usize,
    pub delivering: usize,
    /// Idle or charging
    pub at_base: usize,
    pub low_battery: usize,
    /// Rounded mean battery percentage, 0 for an empty fleet
    pub average_battery: u32,

    pub total_orders: usize,
    pub pending_orders: usize,
    pub delivered_orders: usize,
    pub urgent_orders: usize,
    /// Rounded delivered/total percentage, 0 with no orders
    pub delivery_rate: u32,

    pub drones_by_status: Vec<(DroneStatus, usize)>,
    pub orders_by_priority: Vec<(Priority, usize)>,
    pub orders_by_status: Vec<(OrderStatus, usize)>,
}

pub fn average_battery(drones: &[Drone]) -> u32 {
    if drones.is_empty() {
        return 0;
    }
    let sum: f64 = drones.iter().map(|d| d.battery_level).sum();
    (sum / drones.len() as f64).round() as u32
}

pub fn delivery_rate(orders: &[Order]) -> u32 {
    if orders.is_empty() {
        return 0;
    }
    let delivered = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Delivered)
        .count();
    (delivered as f64 / orders.len() as f64 * 100.0).round() as u32
}

/// Orders plotted on the map: still pending or assigned
pub fn map_visible_orders(orders: &[Order]) -> impl Iterator<Item = &Order> {
    orders.iter().filter(|o| o.is_map_visible())
}

pub fn summarize(drones: &[Drone], orders: &[Order]) -> FleetSummary {
    let drones_with = |status: DroneStatus| drones.iter().filter(|d| d.status == status).count();
    let orders_with = |status: OrderStatus| orders.iter().filter(|o| o.status == status).count();
    let orders_at = |priority: Priority| orders.iter().filter(|o| o.priority == priority).count();

    FleetSummary {
        total_drones: drones.len(),
        active_drones: drones.iter().filter(|d| d.status.is_active()).count(),
        in_flight: drones_with(DroneStatus::Flying),
        delivering: drones_with(DroneStatus::Delivering),
        at_base: drones.iter().filter(|d| d.status.is_at_base()).count(),
        low_battery: drones.iter().filter(|d| d.is_low_battery()).count(),
        average_battery: average_battery(drones),

        total_orders: orders.len(),
        pending_orders: orders_with(OrderStatus::Pending),
        delivered_orders: orders_with(OrderStatus::Delivered),
        urgent_orders: orders_at(Priority::Urgent),
        delivery_rate: delivery_rate(orders),

        drones_by_status: DroneStatus::ALL
            .into_iter()
            .map(|status| (status, drones_with(status)))
            .collect(),
        orders_by_priority: Priority::ALL
            .into_iter()
            .map(|priority| (priority, orders_at(priority)))
            .collect(),
        orders_by_status: OrderStatus::ALL
            .into_iter()
            .map(|status| (status, orders_with(status)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fleet() -> Vec<Drone> {
        vec![
            Drone::new("d-1", "Falcon").with_status(DroneStatus::Flying).with_battery(80.0),
            Drone::new("d-2", "Hawk").with_status(DroneStatus::Delivering).with_battery(25.0),
            Drone::new("d-3", "Kite").with_status(DroneStatus::Loading).with_battery(60.0),
            Drone::new("d-4", "Swift").with_status(DroneStatus::Charging).with_battery(10.0),
            Drone::new("d-5", "Wren").with_status(DroneStatus::Idle).with_battery(100.0),
            Drone::new("d-6", "Jay").with_status(DroneStatus::Maintenance).with_battery(50.5),
        ]
    }

    fn backlog() -> Vec<Order> {
        vec![
            Order::new("o-1", "Ana").with_status(OrderStatus::Delivered),
            Order::new("o-2", "Bia")
                .with_status(OrderStatus::Pending)
                .with_priority(Priority::Urgent),
            Order::new("o-3", "Caio").with_status(OrderStatus::Pending),
            Order::new("o-4", "Duda")
                .with_status(OrderStatus::Assigned)
                .with_priority(Priority::Urgent),
            Order::new("o-5", "Edu")
                .with_status(OrderStatus::Delivered)
                .with_priority(Priority::Low),
            Order::new("o-6", "Fabi").with_status(OrderStatus::Cancelled),
        ]
    }

    #[test]
    fn test_empty_inputs_are_zero() {
        let summary = summarize(&[], &[]);
        assert_eq!(summary.average_battery, 0);
        assert_eq!(summary.delivery_rate, 0);
        assert_eq!(summary.total_drones, 0);
        assert!(summary.drones_by_status.iter().all(|(_, n)| *n == 0));
    }

    #[test]
    fn test_fleet_counts() {
        let summary = summarize(&fleet(), &[]);
        assert_eq!(summary.total_drones, 6);
        assert_eq!(summary.active_drones, 3);
        assert_eq!(summary.in_flight, 1);
        assert_eq!(summary.delivering, 1);
        assert_eq!(summary.at_base, 2);
        assert_eq!(summary.low_battery, 2);
        // (80 + 25 + 60 + 10 + 100 + 50.5) / 6 = 54.25
        assert_eq!(summary.average_battery, 54);
    }

    #[test]
    fn test_average_rounds_half_up() {
        let drones = vec![
            Drone::new("d-1", "A").with_battery(50.0),
            Drone::new("d-2", "B").with_battery(51.0),
        ];
        assert_eq!(average_battery(&drones), 51);
    }

    #[test]
    fn test_order_counts() {
        let summary = summarize(&[], &backlog());
        assert_eq!(summary.total_orders, 6);
        assert_eq!(summary.pending_orders, 2);
        assert_eq!(summary.delivered_orders, 2);
        assert_eq!(summary.urgent_orders, 2);
        // 2 / 6 = 33.3%
        assert_eq!(summary.delivery_rate, 33);
        assert_eq!(summary.orders_by_priority[0], (Priority::Urgent, 2));
        assert_eq!(summary.orders_by_status[4], (OrderStatus::Cancelled, 1));
    }

    #[test]
    fn test_map_visible_orders() {
        let orders = backlog();
        let visible: Vec<&str> = map_visible_orders(&orders).map(|o| o.id.as_str()).collect();
        assert_eq!(visible, vec!["o-2", "o-3", "o-4"]);
    }
}
