use chrono::{Local, NaiveDate};

use stockroom_core::{DomainResult, Entity};

use crate::fields::{ExpirationDate, Price, ProductCode, ProductName, Quantity, Warranty};

/// Validated field set shared by every product category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFields {
    pub code: ProductCode,
    pub name: ProductName,
    pub price: Price,
    pub quantity: Quantity,
    pub supplier: String,
}

/// Category-specific payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    /// No category data (only produced by stores that hold bare base rows).
    Base,
    Perishable { expiration_date: ExpirationDate },
    Durable { warranty: Warranty },
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Base => "base",
            Category::Perishable { .. } => "perishable",
            Category::Durable { .. } => "durable",
        }
    }
}

/// A product held in the inventory.
///
/// Fields are private; only the price can change after construction, and only
/// through [`Product::set_price`], which re-validates the new amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    code: ProductCode,
    name: ProductName,
    price: Price,
    quantity: Quantity,
    supplier: String,
    category: Category,
}

/// Raw expiration input: user text (`dd/mm/yyyy`) or an already structured date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpirationInput {
    Text(String),
    Date(NaiveDate),
}

impl ExpirationInput {
    fn resolve(&self, today: NaiveDate) -> DomainResult<ExpirationDate> {
        let date = match self {
            ExpirationInput::Text(raw) => ExpirationDate::parse(raw)?,
            ExpirationInput::Date(date) => ExpirationDate::from_date(*date),
        };
        date.ensure_after(today)
    }
}

/// Raw category input accompanying a [`CreateProduct`] command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryInput {
    Base,
    Perishable { expiration_date: ExpirationInput },
    Durable { warranty: String },
}

/// Command: CreateProduct, carrying unvalidated field text (e.g. from the menu).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProduct {
    pub code: String,
    pub name: String,
    pub price: String,
    pub quantity: String,
    pub supplier: String,
    pub category: CategoryInput,
}

impl Product {
    /// Validate a [`CreateProduct`] command against the local wall-clock date.
    pub fn create(cmd: &CreateProduct) -> DomainResult<Self> {
        Self::create_on(cmd, Local::now().date_naive())
    }

    /// Validate a [`CreateProduct`] command, treating `today` as the current date.
    pub fn create_on(cmd: &CreateProduct, today: NaiveDate) -> DomainResult<Self> {
        let fields = ProductFields {
            code: ProductCode::parse(&cmd.code)?,
            name: ProductName::parse(&cmd.name)?,
            price: Price::parse(&cmd.price)?,
            quantity: Quantity::parse(&cmd.quantity)?,
            supplier: cmd.supplier.trim().to_string(),
        };

        let category = match &cmd.category {
            CategoryInput::Base => Category::Base,
            CategoryInput::Perishable { expiration_date } => Category::Perishable {
                expiration_date: expiration_date.resolve(today)?,
            },
            CategoryInput::Durable { warranty } => Category::Durable {
                warranty: Warranty::parse(warranty)?,
            },
        };

        Ok(Self::restore(fields, category))
    }

    pub fn base(fields: ProductFields) -> Self {
        Self::restore(fields, Category::Base)
    }

    pub fn durable(fields: ProductFields, warranty: Warranty) -> Self {
        Self::restore(fields, Category::Durable { warranty })
    }

    /// Build a perishable product whose expiration must fall after `today`.
    pub fn perishable(
        fields: ProductFields,
        expiration_date: ExpirationDate,
        today: NaiveDate,
    ) -> DomainResult<Self> {
        let expiration_date = expiration_date.ensure_after(today)?;
        Ok(Self::restore(fields, Category::Perishable { expiration_date }))
    }

    /// Reassemble a product from already-validated stored values.
    ///
    /// Skips the expiration-in-the-future rule, which only binds creation.
    pub fn restore(fields: ProductFields, category: Category) -> Self {
        let ProductFields {
            code,
            name,
            price,
            quantity,
            supplier,
        } = fields;
        Self {
            code,
            name,
            price,
            quantity,
            supplier,
            category,
        }
    }

    pub fn code(&self) -> &ProductCode {
        &self.code
    }

    pub fn name(&self) -> &ProductName {
        &self.name
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn expiration_date(&self) -> Option<ExpirationDate> {
        match self.category {
            Category::Perishable { expiration_date } => Some(expiration_date),
            _ => None,
        }
    }

    pub fn warranty(&self) -> Option<Warranty> {
        match self.category {
            Category::Durable { warranty } => Some(warranty),
            _ => None,
        }
    }

    /// Validate and assign a new price. The old price is kept on failure.
    pub fn set_price<P>(&mut self, price: P) -> DomainResult<()>
    where
        P: TryInto<Price, Error = stockroom_core::DomainError>,
    {
        self.price = price.try_into()?;
        Ok(())
    }

    /// Assign an already-validated price.
    pub fn replace_price(&mut self, price: Price) {
        self.price = price;
    }
}

impl Entity for Product {
    type Id = ProductCode;

    fn id(&self) -> &Self::Id {
        &self.code
    }
}

/// Display text: `<name> <price>`, plus the warranty for durable products.
///
/// Expiration dates are left to the caller, which formats them alongside.
impl core::fmt::Display for Product {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.name, self.price)?;
        if let Category::Durable { warranty } = &self.category {
            write!(f, " - Warranty: {warranty}")?;
        }
        Ok(())
    }
}
