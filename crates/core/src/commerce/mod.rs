mod types;

pub use types::{
    Category, CategoryPatch, NewCategory, NewOrder, NewOrderItem, NewProduct, NewUser, Order,
    OrderItem, Product, ProductPatch, User, UserPatch,
};
