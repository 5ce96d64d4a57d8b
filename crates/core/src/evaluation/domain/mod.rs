pub mod confusion_matrix;
