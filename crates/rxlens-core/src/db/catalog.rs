//! Catalog table operations.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::{Database, DbResult};
use crate::models::{CompositionRow, IngredientRow, MedicineId, MedicineRow};

/// Row counts written by [`Database::replace_catalog`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportCounts {
    pub ingredients: usize,
    pub medicines: usize,
    pub composition_rows: usize,
}

impl Database {
    /// Insert or update an ingredient.
    pub fn upsert_ingredient(&self, row: &IngredientRow) -> DbResult<()> {
        upsert_ingredient(&self.conn, row)
    }

    /// Insert or update a medicine.
    pub fn upsert_medicine(&self, row: &MedicineRow) -> DbResult<()> {
        upsert_medicine(&self.conn, row)
    }

    /// Append a composition line.
    pub fn insert_composition(&self, row: &CompositionRow) -> DbResult<()> {
        insert_composition(&self.conn, row)
    }

    /// Get a medicine row by id.
    pub fn get_medicine_row(&self, medicine_id: MedicineId) -> DbResult<Option<MedicineRow>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT medicine_id, medicine_name, unit_size, mrp, group_name, category
                FROM medicines
                WHERE medicine_id = ?
                "#,
                [medicine_id],
                medicine_from_sql,
            )
            .optional()?;
        Ok(row)
    }

    /// All ingredients ordered by id.
    pub fn list_ingredient_rows(&self) -> DbResult<Vec<IngredientRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT drug_id, drug_name FROM drugs ORDER BY drug_id")?;
        let rows = stmt.query_map([], |row| {
            Ok(IngredientRow {
                drug_id: row.get(0)?,
                drug_name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// All medicines ordered by id.
    pub fn list_medicine_rows(&self) -> DbResult<Vec<MedicineRow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT medicine_id, medicine_name, unit_size, mrp, group_name, category
            FROM medicines
            ORDER BY medicine_id
            "#,
        )?;
        let rows = stmt.query_map([], medicine_from_sql)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// All composition lines in insertion order.
    pub fn list_composition_rows(&self) -> DbResult<Vec<CompositionRow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT medicine_id, drug_id, amount, unit
            FROM composition
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CompositionRow {
                medicine_id: row.get(0)?,
                drug_id: row.get(1)?,
                amount: row.get(2)?,
                unit: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn count_medicines(&self) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM medicines", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Replace every catalog table in one transaction. On error nothing
    /// changes.
    pub fn replace_catalog(
        &mut self,
        ingredients: &[IngredientRow],
        medicines: &[MedicineRow],
        compositions: &[CompositionRow],
    ) -> DbResult<ImportCounts> {
        let tx = self.transaction()?;
        tx.execute_batch(
            r#"
            DELETE FROM composition;
            DELETE FROM medicines;
            DELETE FROM drugs;
            "#,
        )?;

        for row in ingredients {
            upsert_ingredient(&tx, row)?;
        }
        for row in medicines {
            upsert_medicine(&tx, row)?;
        }
        for row in compositions {
            insert_composition(&tx, row)?;
        }
        tx.commit()?;

        let counts = ImportCounts {
            ingredients: ingredients.len(),
            medicines: medicines.len(),
            composition_rows: compositions.len(),
        };
        info!(
            ingredients = counts.ingredients,
            medicines = counts.medicines,
            composition_rows = counts.composition_rows,
            "Replaced catalog tables"
        );
        Ok(counts)
    }
}

fn upsert_ingredient(conn: &Connection, row: &IngredientRow) -> DbResult<()> {
    conn.execute(
        r#"
        INSERT INTO drugs (drug_id, drug_name) VALUES (?1, ?2)
        ON CONFLICT(drug_id) DO UPDATE SET drug_name = excluded.drug_name
        "#,
        params![row.drug_id, row.drug_name],
    )?;
    Ok(())
}

fn upsert_medicine(conn: &Connection, row: &MedicineRow) -> DbResult<()> {
    conn.execute(
        r#"
        INSERT INTO medicines (medicine_id, medicine_name, unit_size, mrp, group_name, category)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(medicine_id) DO UPDATE SET
            medicine_name = excluded.medicine_name,
            unit_size = excluded.unit_size,
            mrp = excluded.mrp,
            group_name = excluded.group_name,
            category = excluded.category,
            loaded_at = datetime('now')
        "#,
        params![
            row.medicine_id,
            row.name,
            row.unit_size,
            row.price,
            row.group_name,
            row.category,
        ],
    )?;
    Ok(())
}

fn insert_composition(conn: &Connection, row: &CompositionRow) -> DbResult<()> {
    conn.execute(
        "INSERT INTO composition (medicine_id, drug_id, amount, unit) VALUES (?1, ?2, ?3, ?4)",
        params![row.medicine_id, row.drug_id, row.amount, row.unit],
    )?;
    Ok(())
}

fn medicine_from_sql(row: &rusqlite::Row<'_>) -> rusqlite::Result<MedicineRow> {
    Ok(MedicineRow {
        medicine_id: row.get(0)?,
        name: row.get(1)?,
        unit_size: row.get(2)?,
        price: row.get(3)?,
        group_name: row.get(4)?,
        category: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> (Vec<IngredientRow>, Vec<MedicineRow>, Vec<CompositionRow>) {
        let ingredients = vec![
            IngredientRow { drug_id: 1, drug_name: "Paracetamol".into() },
            IngredientRow { drug_id: 2, drug_name: "Caffeine".into() },
        ];
        let mut tablet = MedicineRow::new(1, "Paracetamol and Caffeine Tablets");
        tablet.price = 12.5;
        tablet.category = "tablet".into();
        tablet.unit_size = "10's".into();
        let medicines = vec![tablet, MedicineRow::new(2, "Cough Linctus")];
        let compositions = vec![
            CompositionRow::new(1, 1, "500", "mg"),
            CompositionRow::new(1, 2, "30", "mg"),
        ];
        (ingredients, medicines, compositions)
    }

    #[test]
    fn test_replace_and_list() {
        let mut db = Database::open_in_memory().unwrap();
        let (ingredients, medicines, compositions) = rows();

        let counts = db.replace_catalog(&ingredients, &medicines, &compositions).unwrap();
        assert_eq!(counts.medicines, 2);
        assert_eq!(counts.composition_rows, 2);

        assert_eq!(db.list_ingredient_rows().unwrap(), ingredients);
        assert_eq!(db.list_medicine_rows().unwrap(), medicines);
        assert_eq!(db.list_composition_rows().unwrap(), compositions);
        assert_eq!(db.count_medicines().unwrap(), 2);
    }

    #[test]
    fn test_replace_discards_previous_contents() {
        let mut db = Database::open_in_memory().unwrap();
        let (ingredients, medicines, compositions) = rows();
        db.replace_catalog(&ingredients, &medicines, &compositions).unwrap();

        db.replace_catalog(&[], &[MedicineRow::new(9, "Only")], &[]).unwrap();

        assert_eq!(db.count_medicines().unwrap(), 1);
        assert!(db.list_composition_rows().unwrap().is_empty());
        assert!(db.list_ingredient_rows().unwrap().is_empty());
    }

    #[test]
    fn test_failed_replace_rolls_back() {
        let mut db = Database::open_in_memory().unwrap();
        let (ingredients, medicines, compositions) = rows();
        db.replace_catalog(&ingredients, &medicines, &compositions).unwrap();

        // Composition for a medicine that does not exist violates the foreign key
        let result = db.replace_catalog(&[], &[], &[CompositionRow::new(42, 1, "5", "mg")]);
        assert!(result.is_err());

        assert_eq!(db.count_medicines().unwrap(), 2);
        assert_eq!(db.list_composition_rows().unwrap().len(), 2);
    }

    #[test]
    fn test_get_medicine_row() {
        let db = Database::open_in_memory().unwrap();
        let mut row = MedicineRow::new(3, "Cetirizine Tablets IP 10 mg");
        row.price = 4.0;
        db.upsert_medicine(&row).unwrap();

        assert_eq!(db.get_medicine_row(3).unwrap(), Some(row.clone()));
        assert_eq!(db.get_medicine_row(4).unwrap(), None);

        row.price = 5.0;
        db.upsert_medicine(&row).unwrap();
        assert_eq!(db.get_medicine_row(3).unwrap().unwrap().price, 5.0);
    }
}
