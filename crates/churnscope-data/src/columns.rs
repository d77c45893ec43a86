//! Well-known column names of the customer and probability datasets.

pub const CUSTOMER_ID: &str = "customerID";
pub const CONTRACT: &str = "Contract";
pub const INTERNET_SERVICE: &str = "InternetService";
pub const PAYMENT_METHOD: &str = "PaymentMethod";
pub const TENURE: &str = "tenure";
pub const MONTHLY_CHARGES: &str = "MonthlyCharges";
pub const TOTAL_CHARGES: &str = "TotalCharges";
pub const CHURN: &str = "Churn";
pub const CHURN_PROBABILITY: &str = "churn_probability";

/// Columns that must be present in the customer dataset.
pub const REQUIRED: [&str; 7] = [
    CUSTOMER_ID,
    CONTRACT,
    INTERNET_SERVICE,
    TENURE,
    MONTHLY_CHARGES,
    TOTAL_CHARGES,
    CHURN,
];

/// Columns with bespoke filter controls, excluded from the dynamic catalog.
pub const CORE_FILTERED: [&str; 5] = [CUSTOMER_ID, CONTRACT, INTERNET_SERVICE, TENURE, CHURN];

/// Rendered churn labels that count as a churned customer.
pub const CHURNED_LABELS: [&str; 2] = ["Yes", "1"];
