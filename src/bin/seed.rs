//! Seed the configured database with demo data.
//!
//! Creates customers, opportunities spread across every stage, and a mix of
//! pending/done tasks, all through the domain services so the interaction
//! log fills in alongside. Points at `~/.crmdesk/crmdesk.db` unless
//! `CRMDESK_DB_PATH` says otherwise.

use chrono::{Duration, Utc};

use crmdesk::db::{CrmDb, Customer, Opportunity, Stage, Task, TaskPriority, TaskType};
use crmdesk::{CustomerService, OpportunityService, ReportService, TaskService};

const COMPANIES: [(&str, &str, &str); 8] = [
    ("Ana Silva", "Tech Solutions", "Sao Paulo"),
    ("Carlos Souza", "Inova Digital", "Rio de Janeiro"),
    ("Maria Santos", "Global Corp", "Belo Horizonte"),
    ("Pedro Oliveira", "Mega Sistemas", "Curitiba"),
    ("Juliana Ferreira", "SoftTech", "Porto Alegre"),
    ("Roberto Alves", "Data Analytics", "Recife"),
    ("Fernanda Lima", "Cloud Services", "Fortaleza"),
    ("Ricardo Martins", "Smart Business", "Brasilia"),
];

const DEAL_TITLES: [&str; 6] = [
    "Annual license renewal",
    "Fleet management rollout",
    "Support contract upgrade",
    "Analytics platform pilot",
    "Training package",
    "Infrastructure migration",
];

const TASK_TYPES: [TaskType; 6] = [
    TaskType::Call,
    TaskType::Email,
    TaskType::Meeting,
    TaskType::Chat,
    TaskType::Visit,
    TaskType::Other,
];

fn main() {
    env_logger::init();

    let db = match CrmDb::open() {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    let customers = CustomerService::new(&db);
    let opportunities = OpportunityService::new(&db);
    let tasks = TaskService::new(&db);

    let mut customer_ids = Vec::new();
    for (i, (name, company, city)) in COMPANIES.iter().enumerate() {
        let customer = Customer {
            name: name.to_string(),
            email: format!("contact{}@{}.example.com", i + 1, company.to_lowercase().replace(' ', "")),
            phone: format!("(11) 9{:04}-{:04}", 8100 + i, 2000 + i),
            company: company.to_string(),
            city: city.to_string(),
            state: "SP".to_string(),
            ..Customer::default()
        };
        match customers.create(&customer) {
            Ok(id) => customer_ids.push(id),
            Err(e) => log::warn!("Skipping customer {}: {}", name, e),
        }
    }

    let mut opportunity_count = 0;
    for (i, title) in DEAL_TITLES.iter().cycle().take(customer_ids.len() * 2).enumerate() {
        let customer_id = customer_ids[i % customer_ids.len()];
        let stage = Stage::ALL[i % Stage::ALL.len()];
        let opportunity = Opportunity {
            customer_id,
            title: title.to_string(),
            stage,
            value: 1000.0 * (i as f64 + 1.0),
            probability: ((i * 17) % 101) as i64,
            expected_close_date: Some(Utc::now().date_naive() + Duration::days(10 + i as i64)),
            owner: "Rita Gomes".to_string(),
            ..Opportunity::default()
        };
        match opportunities.create(&opportunity) {
            Ok(_) => opportunity_count += 1,
            Err(e) => log::warn!("Skipping opportunity '{}': {}", title, e),
        }
    }

    let mut task_count = 0;
    for (i, customer_id) in customer_ids.iter().enumerate() {
        let task = Task {
            customer_id: *customer_id,
            description: format!("Follow up with account #{}", customer_id),
            task_type: TASK_TYPES[i % TASK_TYPES.len()],
            scheduled_at: Some(Utc::now().naive_utc() + Duration::hours(i as i64 * 6)),
            priority: TaskPriority::ALL[i % TaskPriority::ALL.len()],
            ..Task::default()
        };
        match tasks.create(&task) {
            Ok(id) => {
                task_count += 1;
                // Every third task is already wrapped up
                if i % 3 == 2 {
                    if let Err(e) = tasks.mark_done(id) {
                        log::warn!("Could not complete task {}: {}", id, e);
                    }
                }
            }
            Err(e) => log::warn!("Skipping task for customer {}: {}", customer_id, e),
        }
    }

    let reports = ReportService::new(&db);
    println!("Seeded {} customers, {} opportunities, {} tasks", customer_ids.len(), opportunity_count, task_count);
    println!(
        "Pipeline: {} open opportunities, weighted value {:.2}, conversion rate {:.1}%",
        reports.open_opportunities(),
        reports.weighted_open_value(),
        reports.conversion_rate()
    );
}
