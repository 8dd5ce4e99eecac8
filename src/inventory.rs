use serde::Serialize;

use crate::models::{ConsumableModel, StockLevel, ToolModel, ToolStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StockSummary {
    pub total: usize,
    pub out_of_stock: usize,
    pub low: usize,
    pub normal: usize,
    pub overstocked: usize,
}

impl StockSummary {
    pub fn needs_attention(&self) -> usize {
        self.out_of_stock + self.low
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ToolSummary {
    pub total: usize,
    pub available: usize,
    pub checked_out: usize,
    pub maintenance: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub tools: ToolSummary,
    pub stock: StockSummary,
    /// 在庫切れ → 在庫少の順、同レベル内は名前順
    pub restock_list: Vec<ConsumableModel>,
}

pub fn summarize_stock(consumables: &[ConsumableModel]) -> StockSummary {
    consumables
        .iter()
        .fold(StockSummary::default(), |mut summary, consumable| {
            summary.total += 1;
            match consumable.stock_level() {
                StockLevel::OutOfStock => summary.out_of_stock += 1,
                StockLevel::Low => summary.low += 1,
                StockLevel::Normal => summary.normal += 1,
                StockLevel::Overstocked => summary.overstocked += 1,
            }
            summary
        })
}

/// Tools with an unrecognised status only count toward `total`.
pub fn summarize_tools(tools: &[ToolModel]) -> ToolSummary {
    tools.iter().fold(ToolSummary::default(), |mut summary, tool| {
        summary.total += 1;
        match tool.status() {
            Some(ToolStatus::Available) => summary.available += 1,
            Some(ToolStatus::CheckedOut) => summary.checked_out += 1,
            Some(ToolStatus::Maintenance) => summary.maintenance += 1,
            None => {
                tracing::debug!("tool {} has unknown status '{}'", tool.id, tool.status);
            }
        }
        summary
    })
}

pub fn restock_list(consumables: &[ConsumableModel]) -> Vec<ConsumableModel> {
    let mut list: Vec<ConsumableModel> = consumables
        .iter()
        .filter(|c| matches!(c.stock_level(), StockLevel::OutOfStock | StockLevel::Low))
        .cloned()
        .collect();
    list.sort_by(|a, b| {
        let rank = |c: &ConsumableModel| (c.stock_level() != StockLevel::OutOfStock) as u8;
        rank(a).cmp(&rank(b)).then_with(|| a.name.cmp(&b.name))
    });
    list
}

pub fn summarize_dashboard(
    tools: &[ToolModel],
    consumables: &[ConsumableModel],
) -> DashboardSummary {
    DashboardSummary {
        tools: summarize_tools(tools),
        stock: summarize_stock(consumables),
        restock_list: restock_list(consumables),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consumable(name: &str, current: f64) -> ConsumableModel {
        ConsumableModel {
            id: name.to_lowercase(),
            name: name.to_string(),
            current_quantity: current,
            min_quantity: 10.0,
            max_quantity: 100.0,
            unit: "pcs".to_string(),
        }
    }

    fn tool(id: &str, status: &str) -> ToolModel {
        ToolModel {
            id: id.to_string(),
            name: id.to_string(),
            brand: None,
            model: None,
            status: status.to_string(),
            current_holder: None,
        }
    }

    #[test]
    fn test_stock_partition() {
        let consumables = vec![
            consumable("Tape", 0.0),
            consumable("Gloves", 4.0),
            consumable("Rags", 10.0),
            consumable("Screws", 50.0),
            consumable("Zip ties", 250.0),
        ];
        let summary = summarize_stock(&consumables);
        assert_eq!(
            summary,
            StockSummary {
                total: 5,
                out_of_stock: 1,
                low: 2,
                normal: 1,
                overstocked: 1,
            }
        );
        assert_eq!(summary.needs_attention(), 3);
    }

    #[test]
    fn test_restock_list_order() {
        let consumables = vec![
            consumable("Rags", 10.0),
            consumable("Tape", 0.0),
            consumable("Gloves", 4.0),
            consumable("Screws", 50.0),
            consumable("Blades", 0.0),
        ];
        let names: Vec<String> = restock_list(&consumables).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Blades", "Tape", "Gloves", "Rags"]);
    }

    #[test]
    fn test_tool_summary() {
        let tools = vec![
            tool("t1", "available"),
            tool("t2", "checked_out"),
            tool("t3", "checkedOut"),
            tool("t4", "maintenance"),
            tool("t5", "missing"),
        ];
        assert_eq!(
            summarize_tools(&tools),
            ToolSummary {
                total: 5,
                available: 1,
                checked_out: 2,
                maintenance: 1,
            }
        );
    }

    #[test]
    fn test_dashboard_summary() {
        let dashboard = summarize_dashboard(&[tool("t1", "available")], &[consumable("Tape", 0.0)]);
        assert_eq!(dashboard.tools.available, 1);
        assert_eq!(dashboard.stock.out_of_stock, 1);
        assert_eq!(dashboard.restock_list.len(), 1);
    }
}
