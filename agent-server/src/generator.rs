use agent_core::tickets::{Severity, Ticket};
use rand::seq::SliceRandom;
use rand::Rng;

struct ErrorTemplate {
    issues: &'static [&'static str],
    messages: &'static [&'static str],
    error_log: &'static str,
    severity: Severity,
    checkout_failures: (u32, u32),
    affected_customers: (u32, u32),
}

const TEMPLATES: &[ErrorTemplate] = &[
    // webhook timeout
    ErrorTemplate {
        issues: &[
            "Checkout page shows 'Webhook timeout' error",
            "Orders not processing - webhook timeout",
            "Webhook timeout on checkout - URGENT",
        ],
        messages: &[
            "My customers can't complete purchases! Getting webhook timeout on order.created event. This started right after migration.",
            "Checkout completely broken! Same webhook error as before. Losing sales every minute!",
            "Orders failing at checkout. Webhook timeout error keeps appearing. Help urgently needed!",
        ],
        error_log: "WebhookTimeout: order.created webhook failed after 30s - endpoint unreachable",
        severity: Severity::Critical,
        checkout_failures: (40, 100),
        affected_customers: (20, 50),
    },
    // image 404
    ErrorTemplate {
        issues: &[
            "Product images not loading on frontend",
            "All images showing 404 errors",
            "Broken product images after migration",
        ],
        messages: &[
            "After migration, all my product images are broken. Customers see placeholder images. Getting 404 errors on image URLs.",
            "Image CDN seems broken. All product photos returning 404. This is affecting sales!",
            "Customer complaints about missing product images. Getting 404 on all image requests.",
        ],
        error_log: "404 Not Found: /api/v2/products/images/ - path structure changed in headless",
        severity: Severity::High,
        checkout_failures: (0, 15),
        affected_customers: (0, 10),
    },
    // auth failure
    ErrorTemplate {
        issues: &[
            "API authentication failing after migration",
            "Getting 401 errors on all API calls",
            "Authentication broken post-migration",
        ],
        messages: &[
            "Getting 401 errors on all API calls. My app can't connect anymore. Migration guide wasn't clear about new auth format.",
            "All API requests failing with 401. Used to work fine before migration. Need urgent help!",
            "API keys not working anymore. Getting unauthorized errors on every request.",
        ],
        error_log: "401 Unauthorized: Invalid API credentials format - expecting Bearer token",
        severity: Severity::Critical,
        checkout_failures: (0, 5),
        affected_customers: (0, 0),
    },
    // shipping calculation
    ErrorTemplate {
        issues: &[
            "Shipping rates not calculating correctly",
            "Wrong shipping prices at checkout",
            "Shipping cost calculation broken",
        ],
        messages: &[
            "Free shipping isn't working anymore. Customers being charged when they shouldn't be.",
            "Shipping calculator broken - showing wrong rates. Some orders charged $0, others too much.",
            "Shipping rules from old platform didn't migrate properly. Need to reconfigure everything?",
        ],
        error_log: "ShippingError: Legacy shipping rules not migrated to new format",
        severity: Severity::Medium,
        checkout_failures: (5, 25),
        affected_customers: (3, 15),
    },
    // cart persistence
    ErrorTemplate {
        issues: &[
            "Shopping carts not persisting",
            "Cart items disappearing",
            "Cart resets after page refresh",
        ],
        messages: &[
            "Customers complaining that cart items disappear when they navigate away. Cart persistence broken.",
            "Cart session management not working. Items vanish after refresh. Is this a cookie issue?",
            "Cart abandonment way up - items keep disappearing from carts during checkout.",
        ],
        error_log: "SessionError: Cart session cookie format incompatible with headless architecture",
        severity: Severity::High,
        checkout_failures: (30, 70),
        affected_customers: (20, 40),
    },
    // inventory sync
    ErrorTemplate {
        issues: &[
            "Inventory counts not syncing",
            "Stock levels incorrect",
            "Out of stock items showing available",
        ],
        messages: &[
            "Inventory not syncing between systems. Selling items that are out of stock!",
            "Overselling products because inventory sync broken. Customers angry about cancellations.",
            "Inventory webhooks not firing. Stock counts frozen at migration snapshot.",
        ],
        error_log: "InventorySyncError: Webhook inventory.updated not triggering - legacy polling disabled",
        severity: Severity::Critical,
        checkout_failures: (10, 40),
        affected_customers: (5, 20),
    },
    // payment gateway
    ErrorTemplate {
        issues: &[
            "Payment gateway connection failing",
            "Card processing not working",
            "Gateway timeout at checkout",
        ],
        messages: &[
            "Payment processor keeps timing out. Valid cards being declined. Losing sales!",
            "Payment gateway not responding. Customers can't complete transactions.",
            "Card tokenization failing. Payment API returns 500 errors on checkout.",
        ],
        error_log: "PaymentGatewayError: Connection timeout to payment processor - SSL cert mismatch",
        severity: Severity::Critical,
        checkout_failures: (60, 120),
        affected_customers: (30, 60),
    },
];

const MIGRATION_STAGES: &[&str] = &[
    "pre-migration",
    "migration-in-progress",
    "post-migration-day-1",
    "post-migration-day-2",
    "post-migration-day-3",
    "post-migration-day-5",
    "post-migration-week-1",
    "post-migration-week-2",
];

/// Synthesize a batch of realistic migration tickets. With `force_patterns`
/// and a batch of at least 6, a few tickets share 1-2 error types so the
/// observer has a pattern to find. The template tag never appears in the
/// output; a `Ticket` carries no synthetic metadata.
pub fn generate_tickets(count: usize, force_patterns: bool) -> Vec<Ticket> {
    let mut rng = rand::thread_rng();
    let mut tickets = Vec::with_capacity(count);

    if force_patterns && count >= 6 {
        let kinds = rng.gen_range(1..=2);
        let picks = rand::seq::index::sample(&mut rng, TEMPLATES.len(), kinds);
        let pattern_templates: Vec<usize> = picks.into_iter().collect();
        let pattern_count = rng.gen_range(3..=5.min(count / 2));

        for i in 0..pattern_count {
            let template = &TEMPLATES[pattern_templates[i % pattern_templates.len()]];
            tickets.push(make_ticket(&mut rng, i, template));
        }
        for i in pattern_count..count {
            let template = TEMPLATES.choose(&mut rng).unwrap_or(&TEMPLATES[0]);
            tickets.push(make_ticket(&mut rng, i, template));
        }
    } else {
        for i in 0..count {
            let template = TEMPLATES.choose(&mut rng).unwrap_or(&TEMPLATES[0]);
            tickets.push(make_ticket(&mut rng, i, template));
        }
    }

    tickets
}

fn make_ticket(rng: &mut impl Rng, index: usize, template: &ErrorTemplate) -> Ticket {
    let (fail_lo, fail_hi) = template.checkout_failures;
    let (cust_lo, cust_hi) = template.affected_customers;

    Ticket {
        ticket_id: format!("T{:03}", index + 1),
        merchant_id: format!("M{}", rng.gen_range(100..1000)),
        issue: pick(rng, template.issues),
        merchant_message: pick(rng, template.messages),
        error_log: template.error_log.to_string(),
        migration_stage: pick(rng, MIGRATION_STAGES),
        severity: template.severity,
        checkout_failures: rng.gen_range(fail_lo..=fail_hi),
        affected_customers: rng.gen_range(cust_lo..=cust_hi),
    }
}

fn pick(rng: &mut impl Rng, options: &[&str]) -> String {
    options.choose(rng).copied().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn generates_requested_count_with_unique_ids() {
        let tickets = generate_tickets(10, true);
        assert_eq!(tickets.len(), 10);

        let ids: std::collections::BTreeSet<_> =
            tickets.iter().map(|t| t.ticket_id.clone()).collect();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn forced_patterns_repeat_an_error_type() {
        let tickets = generate_tickets(10, true);
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for t in &tickets {
            *counts.entry(t.error_log.as_str()).or_default() += 1;
        }
        assert!(counts.values().any(|&c| c >= 3));
    }

    #[test]
    fn every_ticket_comes_from_a_template() {
        let logs: Vec<&str> = TEMPLATES.iter().map(|t| t.error_log).collect();
        for t in generate_tickets(8, false) {
            assert!(logs.contains(&t.error_log.as_str()));
            assert!(MIGRATION_STAGES.contains(&t.migration_stage.as_str()));
        }
    }

    #[test]
    fn severity_matches_template() {
        for t in generate_tickets(12, false) {
            let template = TEMPLATES
                .iter()
                .find(|tpl| tpl.error_log == t.error_log)
                .expect("template");
            assert_eq!(t.severity, template.severity);
            assert!(t.checkout_failures >= template.checkout_failures.0);
            assert!(t.checkout_failures <= template.checkout_failures.1);
        }
    }

    #[test]
    fn small_batches_skip_pattern_forcing() {
        let tickets = generate_tickets(3, true);
        assert_eq!(tickets.len(), 3);
    }
}
