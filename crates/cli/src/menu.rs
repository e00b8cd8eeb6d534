//! Interactive inventory menu.
//!
//! Reads choices and field values line by line, builds products through the
//! model's validation, and renders every store outcome as its own message.
//! A failed request never ends the loop; only `0` or end of input does.

use std::io::{self, BufRead, Write};

use stockroom_infra::{ProductStore, StoreError};
use stockroom_products::{
    CategoryInput, CreateProduct, ExpirationInput, Price, Product, ProductCode,
};

const MENU: &str = "\
======= Product Inventory =======
1. Add perishable product
2. Add durable product
3. Search product by code
4. Update product price
5. Delete product
6. List all products
0. Exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NewProduct {
    Perishable,
    Durable,
}

/// Prompt for a line, ending the menu if input is exhausted.
macro_rules! ask {
    ($menu:expr, $label:expr) => {
        match $menu.prompt($label)? {
            Some(line) => line,
            None => return Ok(Flow::Exit),
        }
    };
}

pub struct Menu<'s, R, W> {
    store: &'s dyn ProductStore,
    input: R,
    output: W,
}

impl<'s, R: BufRead, W: Write> Menu<'s, R, W> {
    pub fn new(store: &'s dyn ProductStore, input: R, output: W) -> Self {
        Self {
            store,
            input,
            output,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run until the user exits or input ends. Only I/O errors on the
    /// terminal itself are returned.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "{MENU}")?;
            let Some(choice) = self.prompt("Select an option")? else {
                return Ok(());
            };

            let flow = match choice.as_str() {
                "1" => self.add(NewProduct::Perishable)?,
                "2" => self.add(NewProduct::Durable)?,
                "3" => self.search()?,
                "4" => self.update_price()?,
                "5" => self.delete()?,
                "6" => self.list_all()?,
                "0" => Flow::Exit,
                other => {
                    writeln!(self.output, "Invalid option: {other}")?;
                    Flow::Continue
                }
            };

            if flow == Flow::Exit {
                writeln!(self.output, "Goodbye.")?;
                return Ok(());
            }
        }
    }

    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Prompt for a product code; `Ok(None)` means the input was rejected and reported.
    fn ask_code(&mut self, label: &str) -> io::Result<Option<Option<ProductCode>>> {
        let Some(raw) = self.prompt(label)? else {
            return Ok(None);
        };
        match ProductCode::parse(&raw) {
            Ok(code) => Ok(Some(Some(code))),
            Err(err) => {
                writeln!(self.output, "Invalid input: {err}")?;
                Ok(Some(None))
            }
        }
    }

    fn add(&mut self, kind: NewProduct) -> io::Result<Flow> {
        let code = ask!(self, "Product code (6 digits)");
        let name = ask!(self, "Name");
        let price = ask!(self, "Unit price");
        let quantity = ask!(self, "Quantity in stock");
        let supplier = ask!(self, "Supplier");
        let category = match kind {
            NewProduct::Perishable => CategoryInput::Perishable {
                expiration_date: ExpirationInput::Text(ask!(self, "Expiration date (dd/mm/yyyy)")),
            },
            NewProduct::Durable => CategoryInput::Durable {
                warranty: ask!(self, "Warranty (years)"),
            },
        };

        let cmd = CreateProduct {
            code,
            name,
            price,
            quantity,
            supplier,
            category,
        };

        match Product::create(&cmd) {
            Err(err) => writeln!(self.output, "Invalid input: {err}")?,
            Ok(product) => match self.store.create(&product) {
                Ok(()) => writeln!(self.output, "Product {} saved.", product.code())?,
                Err(err) => self.report(&err)?,
            },
        }
        Ok(Flow::Continue)
    }

    fn search(&mut self) -> io::Result<Flow> {
        let Some(code) = self.ask_code("Code to search")? else {
            return Ok(Flow::Exit);
        };
        let Some(code) = code else {
            return Ok(Flow::Continue);
        };

        match self.store.read(&code) {
            Ok(Some(product)) => writeln!(self.output, "Found {code}: {}", describe(&product))?,
            Ok(None) => writeln!(self.output, "No product with code {code}.")?,
            Err(err) => self.report(&err)?,
        }
        Ok(Flow::Continue)
    }

    fn update_price(&mut self) -> io::Result<Flow> {
        let Some(code) = self.ask_code("Code to update")? else {
            return Ok(Flow::Exit);
        };
        let Some(code) = code else {
            return Ok(Flow::Continue);
        };
        let raw = ask!(self, "New price");

        let price = match Price::parse(&raw) {
            Ok(price) => price,
            Err(err) => {
                writeln!(self.output, "Invalid input: {err}")?;
                return Ok(Flow::Continue);
            }
        };

        match self.store.update_price(&code, price) {
            Ok(()) => writeln!(self.output, "Price updated for product {code}.")?,
            Err(err) => self.report(&err)?,
        }
        Ok(Flow::Continue)
    }

    fn delete(&mut self) -> io::Result<Flow> {
        let Some(code) = self.ask_code("Code to delete")? else {
            return Ok(Flow::Exit);
        };
        let Some(code) = code else {
            return Ok(Flow::Continue);
        };

        match self.store.delete(&code) {
            Ok(()) => writeln!(self.output, "Product {code} deleted.")?,
            Err(err) => self.report(&err)?,
        }
        Ok(Flow::Continue)
    }

    fn list_all(&mut self) -> io::Result<Flow> {
        match self.store.list() {
            Ok(products) if products.is_empty() => writeln!(self.output, "Inventory is empty.")?,
            Ok(products) => {
                for product in &products {
                    writeln!(self.output, "{} | {}", product.code(), describe(product))?;
                }
            }
            Err(err) => self.report(&err)?,
        }
        Ok(Flow::Continue)
    }

    fn report(&mut self, err: &StoreError) -> io::Result<()> {
        match err {
            StoreError::NotFound(code) => writeln!(self.output, "No product with code {code}."),
            StoreError::Conflict(code) => {
                writeln!(self.output, "A product with code {code} already exists.")
            }
            StoreError::CorruptData(msg) => {
                writeln!(self.output, "Stored inventory is corrupt: {msg}")
            }
            StoreError::Storage(msg) => writeln!(self.output, "Storage failure: {msg}"),
        }
    }
}

/// Display text plus the expiration date for perishables.
fn describe(product: &Product) -> String {
    match product.expiration_date() {
        Some(date) => format!("{product} - Expires {date}"),
        None => product.to_string(),
    }
}
